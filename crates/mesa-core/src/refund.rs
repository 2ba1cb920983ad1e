//! Refund workflow preconditions.
//!
//! A refund is only meaningful on a completed order and runs through its own
//! small state machine in `refund_status`: `none → requested → refunded`.
//! `requested` may be skipped — the admin is the final authority and can
//! process a refund straight from `none`.
//!
//! The precondition *ordering* here is externally observable (callers assert
//! on exact error messages), so both validators check in the documented
//! order: for processing, amount and reason are required inputs and are
//! checked before the terminal "already refunded" guard.

use crate::error::OrderError;
use crate::status::{OrderStatus, RefundStatus};

// ---------------------------------------------------------------------------
// RefundView
// ---------------------------------------------------------------------------

/// The slice of an order header the refund validators need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefundView {
    pub status: OrderStatus,
    pub refund_status: RefundStatus,
    pub total_amount: f64,
}

// ---------------------------------------------------------------------------
// requestRefund — customer-initiated
// ---------------------------------------------------------------------------

/// Validate a customer refund request. Returns the reason to store.
///
/// Order of checks: reason present, order completed, no prior refund
/// activity. (The order-exists check happens before this, in the store.)
pub fn validate_request_refund(
    view: &RefundView,
    reason: Option<&str>,
) -> Result<String, OrderError> {
    let reason = match reason {
        Some(r) if !r.trim().is_empty() => r.to_string(),
        _ => return Err(OrderError::invalid_input("Refund reason is required")),
    };

    if view.status != OrderStatus::Completed {
        return Err(OrderError::invalid_state(
            "Refund can only be requested for completed orders",
        ));
    }

    if view.refund_status != RefundStatus::None {
        return Err(OrderError::invalid_state(
            "Refund has already been requested or processed",
        ));
    }

    Ok(reason)
}

// ---------------------------------------------------------------------------
// processRefund — admin-initiated
// ---------------------------------------------------------------------------

/// Validate an admin refund. Returns `(amount, reason)` to store.
///
/// Valid from both `none` and `requested`: the customer request step is
/// advisory, never a precondition.
pub fn validate_process_refund(
    view: &RefundView,
    amount: Option<f64>,
    reason: Option<&str>,
) -> Result<(f64, String), OrderError> {
    let amount = match amount {
        Some(a) if a > 0.0 => a,
        _ => return Err(OrderError::invalid_input("Valid refund amount is required")),
    };

    if amount > view.total_amount {
        return Err(OrderError::invalid_input(
            "Refund amount cannot exceed order total",
        ));
    }

    let reason = match reason {
        Some(r) if !r.trim().is_empty() => r.to_string(),
        _ => return Err(OrderError::invalid_input("Refund reason is required")),
    };

    if view.refund_status == RefundStatus::Refunded {
        return Err(OrderError::invalid_state("Order is already refunded"));
    }

    Ok((amount, reason))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
