//! Read-only catalog lookups.
//!
//! The engine treats these rows as an immutable price oracle at
//! order-creation time; the price snapshot stored on each order line is what
//! makes historical totals immune to later menu edits. Catalog CRUD belongs
//! to the storefront surfaces, never to this crate.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};

use mesa_core::store::{MenuItemRef, SetMenuComponent, SetMenuRef};
use mesa_core::view::SetMenuItemView;

/// Look up one menu item. `None` when absent.
pub async fn fetch_menu_item(pool: &PgPool, id: i64) -> Result<Option<MenuItemRef>> {
    let row = sqlx::query(
        r#"
        select id, name, price, is_available
        from menu_items
        where id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("fetch_menu_item failed")?;

    row.map(|r| {
        Ok(MenuItemRef {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
            price: r.try_get("price")?,
            is_available: r.try_get("is_available")?,
        })
    })
    .transpose()
}

/// Look up one set menu with its ordered composition. `None` when absent.
pub async fn fetch_set_menu(pool: &PgPool, id: i64) -> Result<Option<SetMenuRef>> {
    let row = sqlx::query(
        r#"
        select id, name, price, is_available
        from set_menus
        where id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("fetch_set_menu failed")?;

    let Some(r) = row else {
        return Ok(None);
    };

    let items = sqlx::query(
        r#"
        select menu_item_id, quantity
        from set_menu_items
        where set_menu_id = $1
        order by menu_item_id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .context("fetch_set_menu composition failed")?
    .into_iter()
    .map(|r| {
        Ok(SetMenuComponent {
            menu_item_id: r.try_get("menu_item_id")?,
            quantity: r.try_get("quantity")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    Ok(Some(SetMenuRef {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        price: r.try_get("price")?,
        is_available: r.try_get("is_available")?,
        items,
    }))
}

/// Current composition of a set menu with constituent names, for the
/// read-time expansion of set-priced order lines.
pub async fn fetch_set_menu_item_views(
    pool: &PgPool,
    set_menu_id: i64,
) -> Result<Vec<SetMenuItemView>> {
    let rows = sqlx::query(
        r#"
        select mi.name as name, smi.quantity as quantity
        from set_menu_items smi
        join menu_items mi on mi.id = smi.menu_item_id
        where smi.set_menu_id = $1
        order by smi.menu_item_id
        "#,
    )
    .bind(set_menu_id)
    .fetch_all(pool)
    .await
    .context("fetch_set_menu_item_views failed")?;

    rows.into_iter()
        .map(|r| {
            Ok(SetMenuItemView {
                name: r.try_get("name")?,
                quantity: r.try_get("quantity")?,
            })
        })
        .collect()
}
