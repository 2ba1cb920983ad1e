//! Persistence seam for the order engine.
//!
//! `mesa-db` implements [`OrderStore`] against PostgreSQL; `mesa-testkit`
//! provides a deterministic in-memory implementation for scenario tests.
//! Implementations share the pure validators in [`crate::compose`],
//! [`crate::status`] and [`crate::refund`] — precondition ordering and error
//! messages must not be re-derived per backend.

use async_trait::async_trait;

use crate::compose::SubmissionLine;
use crate::error::OrderError;
use crate::status::OrderStatus;
use crate::view::{OrderReceipt, OrderView};

// ---------------------------------------------------------------------------
// Catalog reference types
// ---------------------------------------------------------------------------

/// Read-only menu item reference: the price oracle at order-creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemRef {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
}

/// One constituent of a set menu's composition.
#[derive(Debug, Clone, PartialEq)]
pub struct SetMenuComponent {
    pub menu_item_id: i64,
    pub quantity: i64,
}

/// Read-only set menu reference. The composite price is the set's own
/// price, not a derived sum of its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct SetMenuRef {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
    pub items: Vec<SetMenuComponent>,
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

/// Listing scope for the order reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Staff / admin surfaces: every order.
    All,
    /// Customer surface: only this customer's orders.
    Customer(i64),
}

/// The order engine's persistence interface.
///
/// All mutations to order rows flow through these six operations; catalog
/// rows are read-only from this engine's perspective.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Price and atomically persist a validated submission. The header and
    /// all lines commit or fail together; a partial order is never observable.
    async fn create_order(
        &self,
        customer_id: i64,
        lines: &[SubmissionLine],
    ) -> Result<OrderReceipt, OrderError>;

    /// Expanded view of one order, or NotFound.
    async fn fetch_order(&self, order_id: i64) -> Result<OrderView, OrderError>;

    /// Expanded views, newest first.
    async fn list_orders(&self, scope: OrderScope) -> Result<Vec<OrderView>, OrderError>;

    /// Apply a fulfillment transition and return the updated view.
    async fn set_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
    ) -> Result<OrderView, OrderError>;

    /// Customer-initiated refund request.
    async fn request_refund(
        &self,
        order_id: i64,
        reason: Option<&str>,
    ) -> Result<OrderView, OrderError>;

    /// Admin-initiated refund. Valid with or without a prior request.
    async fn process_refund(
        &self,
        order_id: i64,
        amount: Option<f64>,
        reason: Option<&str>,
    ) -> Result<OrderView, OrderError>;
}
