//! Order persistence: composer, fulfillment transitions, refunds, reader.
//!
//! All mutations to `orders` / `order_lines` flow through [`PgStore`]. The
//! pure preconditions (transition table, refund validators, shape checks)
//! live in `mesa-core`; this module only sequences lookups, applies the
//! checked effects, and assembles read views.
//!
//! Concurrency notes:
//! - the composer's header + lines insert runs in one transaction, so a
//!   partial order (header without lines, or the reverse) is never visible;
//! - status transitions compare-and-swap on the previously read status, so
//!   two racing transitions cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use mesa_core::compose::{
    menu_item_not_found, order_total, set_menu_not_found, PricedLine, PricedRef, SubmissionLine,
};
use mesa_core::refund::{validate_process_refund, validate_request_refund, RefundView};
use mesa_core::status::check_transition;
use mesa_core::store::{OrderScope, OrderStore};
use mesa_core::view::{OrderLineView, OrderReceipt, OrderView};
use mesa_core::{OrderError, OrderStatus, RefundStatus};

use crate::catalog;

// ---------------------------------------------------------------------------
// PgStore
// ---------------------------------------------------------------------------

/// PostgreSQL-backed [`OrderStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn internal(err: impl std::fmt::Display) -> OrderError {
    OrderError::unexpected(err)
}

// ---------------------------------------------------------------------------
// Header row
// ---------------------------------------------------------------------------

struct OrderHeader {
    id: i64,
    customer_id: i64,
    customer_name: Option<String>,
    total_amount: f64,
    status: OrderStatus,
    refund_status: RefundStatus,
    refund_amount: f64,
    refund_reason: Option<String>,
    refunded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

const HEADER_SELECT: &str = r#"
    select
      o.id,
      o.customer_id,
      u.name as customer_name,
      o.total_amount,
      o.status,
      o.refund_status,
      o.refund_amount,
      o.refund_reason,
      o.refunded_at,
      o.created_at
    from orders o
    left join users u on u.id = o.customer_id
"#;

fn header_from_row(row: &sqlx::postgres::PgRow) -> Result<OrderHeader, OrderError> {
    // A status string the enums cannot parse means row-level corruption, so
    // it surfaces as Unexpected rather than a 400.
    let status: String = row.try_get("status").map_err(internal)?;
    let refund_status: String = row.try_get("refund_status").map_err(internal)?;

    Ok(OrderHeader {
        id: row.try_get("id").map_err(internal)?,
        customer_id: row.try_get("customer_id").map_err(internal)?,
        customer_name: row.try_get("customer_name").map_err(internal)?,
        total_amount: row.try_get("total_amount").map_err(internal)?,
        status: OrderStatus::parse(&status).map_err(internal)?,
        refund_status: RefundStatus::parse(&refund_status).map_err(internal)?,
        refund_amount: row.try_get("refund_amount").map_err(internal)?,
        refund_reason: row.try_get("refund_reason").map_err(internal)?,
        refunded_at: row.try_get("refunded_at").map_err(internal)?,
        created_at: row.try_get("created_at").map_err(internal)?,
    })
}

impl PgStore {
    async fn fetch_header(&self, order_id: i64) -> Result<OrderHeader, OrderError> {
        let sql = format!("{HEADER_SELECT} where o.id = $1");
        let row = sqlx::query(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;

        match row {
            Some(r) => header_from_row(&r),
            None => Err(OrderError::not_found("Order not found")),
        }
    }

    /// Assemble the expanded view for a header: lines joined with catalog
    /// names, set-priced lines expanded to their current composition.
    async fn expand(&self, header: OrderHeader) -> Result<OrderView, OrderError> {
        let rows = sqlx::query(
            r#"
            select
              ol.menu_item_id,
              ol.set_menu_id,
              ol.quantity,
              ol.price,
              ol.note,
              mi.name as menu_item_name,
              sm.name as set_menu_name
            from order_lines ol
            left join menu_items mi on mi.id = ol.menu_item_id
            left join set_menus sm on sm.id = ol.set_menu_id
            where ol.order_id = $1
            order by ol.id
            "#,
        )
        .bind(header.id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let menu_item_id: Option<i64> = row.try_get("menu_item_id").map_err(internal)?;
            let set_menu_id: Option<i64> = row.try_get("set_menu_id").map_err(internal)?;
            let menu_item_name: Option<String> =
                row.try_get("menu_item_name").map_err(internal)?;
            let set_menu_name: Option<String> = row.try_get("set_menu_name").map_err(internal)?;

            // Display name follows the priced reference. Fall back to an id
            // label if the catalog row was deleted since.
            let (name, set_menu_items) = match set_menu_id {
                Some(set_id) => {
                    let name = set_menu_name.unwrap_or_else(|| format!("Set menu {set_id}"));
                    let constituents =
                        catalog::fetch_set_menu_item_views(&self.pool, set_id)
                            .await
                            .map_err(internal)?;
                    (name, Some(constituents))
                }
                None => {
                    let id = menu_item_id.unwrap_or_default();
                    (
                        menu_item_name.unwrap_or_else(|| format!("Menu item {id}")),
                        None,
                    )
                }
            };

            items.push(OrderLineView {
                menu_item_id,
                set_menu_id,
                name,
                quantity: row.try_get("quantity").map_err(internal)?,
                price: row.try_get("price").map_err(internal)?,
                note: row.try_get("note").map_err(internal)?,
                set_menu_items,
            });
        }

        Ok(OrderView {
            id: header.id,
            customer_id: header.customer_id,
            customer_name: header.customer_name,
            total_amount: header.total_amount,
            status: header.status,
            refund_status: header.refund_status,
            refund_amount: header.refund_amount,
            refund_reason: header.refund_reason,
            refunded_at: header.refunded_at,
            created_at: header.created_at,
            items,
        })
    }

    /// Price every line against the catalog, capturing unit prices.
    async fn price_lines(
        &self,
        lines: &[SubmissionLine],
    ) -> Result<Vec<PricedLine>, OrderError> {
        let mut priced = Vec::with_capacity(lines.len());
        for line in lines {
            let unit_price = match line.priced_ref() {
                Some(PricedRef::SetMenu(id)) => {
                    catalog::fetch_set_menu(&self.pool, id)
                        .await
                        .map_err(internal)?
                        .ok_or_else(|| set_menu_not_found(id))?
                        .price
                }
                Some(PricedRef::MenuItem(id)) => {
                    catalog::fetch_menu_item(&self.pool, id)
                        .await
                        .map_err(internal)?
                        .ok_or_else(|| menu_item_not_found(id))?
                        .price
                }
                None => {
                    return Err(OrderError::invalid_input(
                        "Each order item must reference a menu item or a set menu",
                    ))
                }
            };

            priced.push(PricedLine {
                menu_item_id: line.menu_item_id,
                set_menu_id: line.set_menu_id,
                quantity: line.quantity,
                unit_price,
                note: line.note.clone(),
            });
        }
        Ok(priced)
    }
}

// ---------------------------------------------------------------------------
// OrderStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(
        &self,
        customer_id: i64,
        lines: &[SubmissionLine],
    ) -> Result<OrderReceipt, OrderError> {
        // Validate and price fully in memory first, then commit once.
        let priced = self.price_lines(lines).await?;
        let total_amount = order_total(&priced);

        let mut tx = self.pool.begin().await.map_err(internal)?;

        let row = sqlx::query(
            r#"
            insert into orders (customer_id, total_amount, status, refund_status)
            values ($1, $2, 'pending', 'none')
            returning id
            "#,
        )
        .bind(customer_id)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;
        let order_id: i64 = row.try_get("id").map_err(internal)?;

        for line in &priced {
            sqlx::query(
                r#"
                insert into order_lines (order_id, menu_item_id, set_menu_id, quantity, price, note)
                values ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_id)
            .bind(line.menu_item_id)
            .bind(line.set_menu_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(&line.note)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        }

        tx.commit().await.map_err(internal)?;

        Ok(OrderReceipt {
            order_id,
            total_amount,
        })
    }

    async fn fetch_order(&self, order_id: i64) -> Result<OrderView, OrderError> {
        let header = self.fetch_header(order_id).await?;
        self.expand(header).await
    }

    async fn list_orders(&self, scope: OrderScope) -> Result<Vec<OrderView>, OrderError> {
        let rows = match scope {
            OrderScope::All => {
                let sql = format!("{HEADER_SELECT} order by o.created_at desc, o.id desc");
                sqlx::query(&sql).fetch_all(&self.pool).await
            }
            OrderScope::Customer(customer_id) => {
                let sql = format!(
                    "{HEADER_SELECT} where o.customer_id = $1 order by o.created_at desc, o.id desc"
                );
                sqlx::query(&sql).bind(customer_id).fetch_all(&self.pool).await
            }
        }
        .map_err(internal)?;

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let header = header_from_row(&row)?;
            views.push(self.expand(header).await?);
        }
        Ok(views)
    }

    async fn set_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<OrderView, OrderError> {
        let header = self.fetch_header(order_id).await?;
        check_transition(header.status, new_status)?;

        // CAS on the status we just read: a racing transition loses cleanly
        // instead of last-write-wins.
        let res = sqlx::query(
            r#"
            update orders
            set status = $1
            where id = $2 and status = $3
            "#,
        )
        .bind(new_status.as_str())
        .bind(order_id)
        .bind(header.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        if res.rows_affected() == 0 {
            return Err(OrderError::invalid_state(format!(
                "Cannot change order status from {} to {}",
                header.status.as_str(),
                new_status.as_str()
            )));
        }

        self.fetch_order(order_id).await
    }

    async fn request_refund(
        &self,
        order_id: i64,
        reason: Option<&str>,
    ) -> Result<OrderView, OrderError> {
        let header = self.fetch_header(order_id).await?;
        let view = RefundView {
            status: header.status,
            refund_status: header.refund_status,
            total_amount: header.total_amount,
        };
        let reason = validate_request_refund(&view, reason)?;

        sqlx::query(
            r#"
            update orders
            set refund_status = 'requested',
                refund_reason = $1,
                refunded_at = now()
            where id = $2
            "#,
        )
        .bind(&reason)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        self.fetch_order(order_id).await
    }

    async fn process_refund(
        &self,
        order_id: i64,
        amount: Option<f64>,
        reason: Option<&str>,
    ) -> Result<OrderView, OrderError> {
        let header = self.fetch_header(order_id).await?;
        let view = RefundView {
            status: header.status,
            refund_status: header.refund_status,
            total_amount: header.total_amount,
        };
        let (amount, reason) = validate_process_refund(&view, amount, reason)?;

        sqlx::query(
            r#"
            update orders
            set refund_status = 'refunded',
                refund_amount = $1,
                refund_reason = $2,
                refunded_at = now()
            where id = $3
            "#,
        )
        .bind(amount)
        .bind(&reason)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        self.fetch_order(order_id).await
    }
}
