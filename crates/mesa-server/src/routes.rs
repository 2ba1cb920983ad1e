//! Axum router and all HTTP handlers for mesa-server.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::info;

use mesa_core::compose::{validate_create_request, SubmissionLine};
use mesa_core::{OrderScope, OrderStatus};

use crate::{
    api_types::{
        CreateOrderRequest, CreateOrderResponse, HealthResponse, ListOrdersQuery,
        OrderActionResponse, OrderItemRequest, RefundActionRequest, UpdateOrderRequest,
    },
    error::ApiError,
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).put(update_order))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

fn to_submission_line(item: &OrderItemRequest) -> SubmissionLine {
    SubmissionLine {
        menu_item_id: item.menu_item_id,
        set_menu_id: item.set_menu_id,
        // Missing quantity fails the positive-quantity check downstream.
        quantity: item.quantity.unwrap_or(0),
        note: item.note.clone(),
    }
}

pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    // Unparseable bodies keep the `{"error": ...}` contract instead of
    // axum's default plain-text rejection.
    let Json(req) =
        payload.map_err(|_| mesa_core::OrderError::invalid_input("Invalid order payload"))?;

    let lines: Vec<SubmissionLine> = req
        .items
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(to_submission_line)
        .collect();

    let customer_id = validate_create_request(req.customer_id, &lines)?;
    let receipt = st.store.create_order(customer_id, &lines).await?;

    info!(
        order_id = receipt.order_id,
        customer_id,
        total_amount = receipt.total_amount,
        "order created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            message: "Order created successfully",
            order_id: receipt.order_id,
            total_amount: receipt.total_amount,
        }),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// GET /orders
// ---------------------------------------------------------------------------

pub(crate) async fn list_orders(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ListOrdersQuery>,
) -> Result<Response, ApiError> {
    let scope = match q.role.as_deref() {
        Some("customer") => match q.customer_id {
            Some(id) => OrderScope::Customer(id),
            None => {
                return Err(mesa_core::OrderError::invalid_input("Customer ID is required").into())
            }
        },
        // staff / admin / omitted all see everything.
        _ => OrderScope::All,
    };

    let views = st.store.list_orders(scope).await?;
    Ok((StatusCode::OK, Json(views)).into_response())
}

// ---------------------------------------------------------------------------
// GET /orders/{id}
// ---------------------------------------------------------------------------

pub(crate) async fn get_order(
    State(st): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|_| mesa_core::OrderError::not_found("Order not found"))?;
    let view = st.store.fetch_order(id).await?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

// ---------------------------------------------------------------------------
// PUT /orders/{id}
// ---------------------------------------------------------------------------

pub(crate) async fn update_order(
    State(st): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    // A non-numeric id names no order; an unparseable body is the same
    // failure as an unrecognized one.
    let Path(id) = id.map_err(|_| mesa_core::OrderError::not_found("Order not found"))?;
    let Json(body) = body
        .map_err(|_| mesa_core::OrderError::invalid_input("Invalid order update request"))?;

    // Schema gate: reject anything that is neither a refund action nor a
    // status update before touching business logic.
    let req: UpdateOrderRequest = serde_json::from_value(body)
        .map_err(|_| mesa_core::OrderError::invalid_input("Invalid order update request"))?;

    let (message, order) = match req {
        UpdateOrderRequest::Status(update) => {
            let new_status = OrderStatus::parse(&update.status)?;
            let order = st.store.set_status(id, new_status).await?;
            info!(order_id = id, status = new_status.as_str(), "order status updated");
            ("Order status updated successfully", order)
        }
        UpdateOrderRequest::Refund(RefundActionRequest::RequestRefund { refund_reason }) => {
            let order = st.store.request_refund(id, refund_reason.as_deref()).await?;
            info!(order_id = id, "refund requested");
            ("Refund requested successfully", order)
        }
        UpdateOrderRequest::Refund(RefundActionRequest::ProcessRefund {
            refund_amount,
            refund_reason,
        }) => {
            let order = st
                .store
                .process_refund(id, refund_amount, refund_reason.as_deref())
                .await?;
            info!(order_id = id, amount = order.refund_amount, "refund processed");
            ("Refund processed successfully", order)
        }
    };

    Ok((StatusCode::OK, Json(OrderActionResponse { message, order })).into_response())
}
