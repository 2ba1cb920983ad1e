//! Request and response types for all mesa-server HTTP endpoints.
//!
//! These types are the schema boundary: loosely-shaped JSON is rejected or
//! normalized here before any business logic runs. The `PUT /orders/{id}`
//! body is a tagged variant selected by the explicit `action` discriminant,
//! with the plain `{status}` form as the untagged fallback.

use serde::{Deserialize, Serialize};

use mesa_core::view::OrderView;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

/// One submitted line. Quantity and references are validated by
/// `mesa_core::compose::validate_create_request`, not by serde, so the
/// caller-facing messages stay under our control.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: Option<i64>,
    pub set_menu_id: Option<i64>,
    pub quantity: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "customerId")]
    pub customer_id: Option<i64>,
    pub items: Option<Vec<OrderItemRequest>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub message: &'static str,
    #[serde(rename = "orderId")]
    pub order_id: i64,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
}

// ---------------------------------------------------------------------------
// GET /orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(rename = "customerId")]
    pub customer_id: Option<i64>,
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// PUT /orders/{id}
// ---------------------------------------------------------------------------

/// Refund sub-workflow actions, tagged by `action`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RefundActionRequest {
    RequestRefund {
        refund_reason: Option<String>,
    },
    ProcessRefund {
        refund_amount: Option<f64>,
        refund_reason: Option<String>,
    },
}

/// Plain fulfillment transition.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// The full `PUT /orders/{id}` body. Refund actions are tried first (they
/// carry the `action` discriminant); anything else must be a status update.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UpdateOrderRequest {
    Refund(RefundActionRequest),
    Status(UpdateStatusRequest),
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderActionResponse {
    pub message: &'static str,
    pub order: OrderView,
}
