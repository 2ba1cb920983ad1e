//! Denormalized order views returned by the reader and mutation endpoints.
//!
//! Set-menu constituents are resolved at read time from the set menu's
//! *current* composition; the priced snapshot lives only in each line's
//! `price` and `quantity`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{OrderStatus, RefundStatus};

/// Constituent of a set-menu line, resolved from the current composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMenuItemView {
    pub name: String,
    pub quantity: i64,
}

/// One priced order line, enriched with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineView {
    pub menu_item_id: Option<i64>,
    pub set_menu_id: Option<i64>,
    /// Set-menu name for set-priced lines, menu-item name otherwise.
    pub name: String,
    pub quantity: i64,
    /// Unit price snapshot captured at order time.
    pub price: f64,
    pub note: Option<String>,
    /// Present only for set-priced lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_menu_items: Option<Vec<SetMenuItemView>>,
}

/// Order header plus customer and expanded lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub refund_status: RefundStatus,
    pub refund_amount: f64,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLineView>,
}

/// What the composer hands back after a successful creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderReceipt {
    pub order_id: i64,
    pub total_amount: f64,
}
