//! In-memory order store.
//!
//! Mirrors the Postgres implementation's sequencing exactly: fetch, then the
//! shared mesa-core validators, then the effect. The catalog is immutable
//! after the builder phase, matching the engine's read-only view of it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mesa_core::compose::{
    menu_item_not_found, order_total, set_menu_not_found, PricedLine, PricedRef, SubmissionLine,
};
use mesa_core::refund::{validate_process_refund, validate_request_refund, RefundView};
use mesa_core::status::check_transition;
use mesa_core::store::{MenuItemRef, OrderScope, OrderStore, SetMenuComponent, SetMenuRef};
use mesa_core::view::{OrderLineView, OrderReceipt, OrderView, SetMenuItemView};
use mesa_core::{OrderError, OrderStatus, RefundStatus};

// ---------------------------------------------------------------------------
// Stored rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct StoredLine {
    menu_item_id: Option<i64>,
    set_menu_id: Option<i64>,
    quantity: i64,
    price: f64,
    note: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredOrder {
    id: i64,
    customer_id: i64,
    total_amount: f64,
    status: OrderStatus,
    refund_status: RefundStatus,
    refund_amount: f64,
    refund_reason: Option<String>,
    refunded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    lines: Vec<StoredLine>,
}

#[derive(Debug, Default)]
struct Inner {
    next_order_id: i64,
    orders: BTreeMap<i64, StoredOrder>,
}

// ---------------------------------------------------------------------------
// MemStore
// ---------------------------------------------------------------------------

/// Builder-style fixture store.
///
/// ```
/// use mesa_testkit::MemStore;
///
/// let store = MemStore::new()
///     .with_customer(7, "Alice Diner")
///     .with_menu_item(3, "Pad Thai", 12.99)
///     .with_set_menu(9, "Lunch Set", 18.0, &[(3, 1)]);
/// # let _ = store;
/// ```
#[derive(Debug)]
pub struct MemStore {
    customers: HashMap<i64, String>,
    menu_items: HashMap<i64, MenuItemRef>,
    set_menus: HashMap<i64, SetMenuRef>,
    inner: Mutex<Inner>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            customers: HashMap::new(),
            menu_items: HashMap::new(),
            set_menus: HashMap::new(),
            inner: Mutex::new(Inner {
                next_order_id: 1,
                orders: BTreeMap::new(),
            }),
        }
    }

    pub fn with_customer(mut self, id: i64, name: &str) -> Self {
        self.customers.insert(id, name.to_string());
        self
    }

    pub fn with_menu_item(mut self, id: i64, name: &str, price: f64) -> Self {
        self.menu_items.insert(
            id,
            MenuItemRef {
                id,
                name: name.to_string(),
                price,
                is_available: true,
            },
        );
        self
    }

    /// `items` is the composition as (menu_item_id, quantity) pairs.
    pub fn with_set_menu(mut self, id: i64, name: &str, price: f64, items: &[(i64, i64)]) -> Self {
        self.set_menus.insert(
            id,
            SetMenuRef {
                id,
                name: name.to_string(),
                price,
                is_available: true,
                items: items
                    .iter()
                    .map(|&(menu_item_id, quantity)| SetMenuComponent {
                        menu_item_id,
                        quantity,
                    })
                    .collect(),
            },
        );
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mem store poisoned")
    }

    fn set_menu_item_views(&self, set_menu_id: i64) -> Vec<SetMenuItemView> {
        self.set_menus
            .get(&set_menu_id)
            .map(|set| {
                set.items
                    .iter()
                    .map(|c| SetMenuItemView {
                        name: self
                            .menu_items
                            .get(&c.menu_item_id)
                            .map(|m| m.name.clone())
                            .unwrap_or_else(|| format!("Menu item {}", c.menu_item_id)),
                        quantity: c.quantity,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn expand(&self, order: &StoredOrder) -> OrderView {
        let items = order
            .lines
            .iter()
            .map(|line| {
                let (name, set_menu_items) = match line.set_menu_id {
                    Some(set_id) => (
                        self.set_menus
                            .get(&set_id)
                            .map(|s| s.name.clone())
                            .unwrap_or_else(|| format!("Set menu {set_id}")),
                        Some(self.set_menu_item_views(set_id)),
                    ),
                    None => {
                        let id = line.menu_item_id.unwrap_or_default();
                        (
                            self.menu_items
                                .get(&id)
                                .map(|m| m.name.clone())
                                .unwrap_or_else(|| format!("Menu item {id}")),
                            None,
                        )
                    }
                };
                OrderLineView {
                    menu_item_id: line.menu_item_id,
                    set_menu_id: line.set_menu_id,
                    name,
                    quantity: line.quantity,
                    price: line.price,
                    note: line.note.clone(),
                    set_menu_items,
                }
            })
            .collect();

        OrderView {
            id: order.id,
            customer_id: order.customer_id,
            customer_name: self.customers.get(&order.customer_id).cloned(),
            total_amount: order.total_amount,
            status: order.status,
            refund_status: order.refund_status,
            refund_amount: order.refund_amount,
            refund_reason: order.refund_reason.clone(),
            refunded_at: order.refunded_at,
            created_at: order.created_at,
            items,
        }
    }

    fn price_lines(&self, lines: &[SubmissionLine]) -> Result<Vec<PricedLine>, OrderError> {
        let mut priced = Vec::with_capacity(lines.len());
        for line in lines {
            let unit_price = match line.priced_ref() {
                Some(PricedRef::SetMenu(id)) => {
                    self.set_menus
                        .get(&id)
                        .ok_or_else(|| set_menu_not_found(id))?
                        .price
                }
                Some(PricedRef::MenuItem(id)) => {
                    self.menu_items
                        .get(&id)
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
impl OrderStore for MemStore {
    async fn create_order(
        &self,
        customer_id: i64,
        lines: &[SubmissionLine],
    ) -> Result<OrderReceipt, OrderError> {
        // Price fully before touching state: all-or-nothing, like the
        // Postgres transaction.
        let priced = self.price_lines(lines)?;
        let total_amount = order_total(&priced);

        let mut inner = self.lock();
        let order_id = inner.next_order_id;
        inner.next_order_id += 1;

        inner.orders.insert(
            order_id,
            StoredOrder {
                id: order_id,
                customer_id,
                total_amount,
                status: OrderStatus::Pending,
                refund_status: RefundStatus::None,
                refund_amount: 0.0,
                refund_reason: None,
                refunded_at: None,
                created_at: Utc::now(),
                lines: priced
                    .into_iter()
                    .map(|l| StoredLine {
                        menu_item_id: l.menu_item_id,
                        set_menu_id: l.set_menu_id,
                        quantity: l.quantity,
                        price: l.unit_price,
                        note: l.note,
                    })
                    .collect(),
            },
        );

        Ok(OrderReceipt {
            order_id,
            total_amount,
        })
    }

    async fn fetch_order(&self, order_id: i64) -> Result<OrderView, OrderError> {
        let inner = self.lock();
        let order = inner
            .orders
            .get(&order_id)
            .ok_or_else(|| OrderError::not_found("Order not found"))?;
        Ok(self.expand(order))
    }

    async fn list_orders(&self, scope: OrderScope) -> Result<Vec<OrderView>, OrderError> {
        let inner = self.lock();
        let mut views: Vec<OrderView> = inner
            .orders
            .values()
            .filter(|o| match scope {
                OrderScope::All => true,
                OrderScope::Customer(id) => o.customer_id == id,
            })
            .map(|o| self.expand(o))
            .collect();
        // Newest first; ids are allocation-ordered so they tie-break.
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(views)
    }

    async fn set_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<OrderView, OrderError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| OrderError::not_found("Order not found"))?;
        check_transition(order.status, new_status)?;
        order.status = new_status;
        let view = self.expand(order);
        Ok(view)
    }

    async fn request_refund(
        &self,
        order_id: i64,
        reason: Option<&str>,
    ) -> Result<OrderView, OrderError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| OrderError::not_found("Order not found"))?;
        let view = RefundView {
            status: order.status,
            refund_status: order.refund_status,
            total_amount: order.total_amount,
        };
        let reason = validate_request_refund(&view, reason)?;

        order.refund_status = RefundStatus::Requested;
        order.refund_reason = Some(reason);
        order.refunded_at = Some(Utc::now());
        let view = self.expand(order);
        Ok(view)
    }

    async fn process_refund(
        &self,
        order_id: i64,
        amount: Option<f64>,
        reason: Option<&str>,
    ) -> Result<OrderView, OrderError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| OrderError::not_found("Order not found"))?;
        let view = RefundView {
            status: order.status,
            refund_status: order.refund_status,
            total_amount: order.total_amount,
        };
        let (amount, reason) = validate_process_refund(&view, amount, reason)?;

        order.refund_status = RefundStatus::Refunded;
        order.refund_amount = amount;
        order.refund_reason = Some(reason);
        order.refunded_at = Some(Utc::now());
        let view = self.expand(order);
        Ok(view)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemStore {
        MemStore::new()
            .with_customer(7, "Alice Diner")
            .with_menu_item(3, "Pad Thai", 12.99)
            .with_menu_item(4, "Spring Rolls", 5.5)
            .with_set_menu(9, "Lunch Set", 18.0, &[(3, 1), (4, 2)])
    }

    fn menu_line(id: i64, qty: i64) -> SubmissionLine {
        SubmissionLine {
            menu_item_id: Some(id),
            set_menu_id: None,
            quantity: qty,
            note: None,
        }
    }

    #[tokio::test]
    async fn create_order_snapshots_prices_and_totals() {
        let store = store();
        let receipt = store
            .create_order(7, &[menu_line(3, 2)])
            .await
            .unwrap();
        assert_eq!(receipt.order_id, 1);
        assert_eq!(receipt.total_amount, 25.98);

        let view = store.fetch_order(1).await.unwrap();
        assert_eq!(view.status, OrderStatus::Pending);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].price, 12.99);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[0].name, "Pad Thai");
        assert_eq!(view.customer_name.as_deref(), Some("Alice Diner"));
    }

    #[tokio::test]
    async fn unknown_references_leave_no_partial_order() {
        let store = store();
        let err = store
            .create_order(7, &[menu_line(3, 1), menu_line(99, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Menu item with ID 99 not found");
        assert_eq!(err, OrderError::NotFound("Menu item with ID 99 not found".into()));

        // Nothing persisted: pricing failed before the insert.
        let all = store.list_orders(OrderScope::All).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn set_priced_line_expands_current_composition() {
        let store = store();
        let line = SubmissionLine {
            menu_item_id: None,
            set_menu_id: Some(9),
            quantity: 1,
            note: None,
        };
        let receipt = store.create_order(7, &[line]).await.unwrap();
        assert_eq!(receipt.total_amount, 18.0);

        let view = store.fetch_order(receipt.order_id).await.unwrap();
        assert_eq!(view.items[0].name, "Lunch Set");
        let constituents = view.items[0].set_menu_items.as_ref().unwrap();
        assert_eq!(constituents.len(), 2);
        assert_eq!(constituents[0].name, "Pad Thai");
        assert_eq!(constituents[1].quantity, 2);
    }

    #[tokio::test]
    async fn list_orders_filters_by_customer() {
        let store = store().with_customer(8, "Bob Booth");
        store.create_order(7, &[menu_line(3, 1)]).await.unwrap();
        store.create_order(8, &[menu_line(4, 1)]).await.unwrap();

        assert_eq!(store.list_orders(OrderScope::All).await.unwrap().len(), 2);
        let mine = store.list_orders(OrderScope::Customer(7)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].customer_id, 7);
    }

    #[tokio::test]
    async fn refund_fields_never_touch_the_total() {
        let store = store();
        let receipt = store.create_order(7, &[menu_line(3, 2)]).await.unwrap();
        let id = receipt.order_id;

        for s in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
            store.set_status(id, s).await.unwrap();
        }
        let view = store
            .process_refund(id, Some(10.0), Some("wrong dish"))
            .await
            .unwrap();
        assert_eq!(view.refund_status, RefundStatus::Refunded);
        assert_eq!(view.refund_amount, 10.0);
        assert_eq!(view.total_amount, 25.98, "refunds must not mutate the total");
    }
}
