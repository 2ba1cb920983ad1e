//! Fulfillment state machine.
//!
//! # Design
//!
//! Order status is a strict forward progression with a single cancellation
//! escape hatch from the two "not yet in the kitchen / still cooking" states.
//! Once food is `ready`, cancellation is disallowed — the order can only be
//! completed. The transition table below is the single source of truth;
//! persistence layers call [`check_transition`] and never encode their own
//! `if` chains.
//!
//! ```text
//!   pending ──► preparing ──► ready ──► completed (terminal)
//!      │            │
//!      └────────────┴──────► cancelled (terminal)
//! ```
//!
//! The refund workflow runs on its own column (`refund_status`) layered on a
//! completed order: `none → requested → refunded` (refunded terminal;
//! `requested` may be skipped — an admin can refund unilaterally).

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Kitchen-progress state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed; kitchen has not started. Initial state.
    Pending,
    /// Kitchen is working on the order.
    Preparing,
    /// Food is ready for pickup / serving.
    Ready,
    /// Order handed over. **Terminal** (refunds run on a separate column).
    Completed,
    /// Order cancelled before it was ready. **Terminal.**
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, OrderError> {
        match s {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrderError::invalid_input(format!(
                "Invalid order status: {other}"
            ))),
        }
    }

    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The transition table. Everything not listed here is illegal.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Preparing)
                | (Pending, Cancelled)
                | (Preparing, Ready)
                | (Preparing, Cancelled)
                | (Ready, Completed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject illegal transitions with the caller-facing message.
///
/// Illegal transitions are rejected, never silently coerced.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(OrderError::invalid_state(format!(
            "Cannot change order status from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

// ---------------------------------------------------------------------------
// RefundStatus
// ---------------------------------------------------------------------------

/// Post-completion monetary state, independent of [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    /// No refund activity.
    None,
    /// Customer asked for a refund; awaiting an admin decision.
    Requested,
    /// Admin processed the refund. **Terminal.**
    Refunded,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Requested => "requested",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, OrderError> {
        match s {
            "none" => Ok(Self::None),
            "requested" => Ok(Self::Requested),
            "refunded" => Ok(Self::Refunded),
            other => Err(OrderError::invalid_input(format!(
                "Invalid refund status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
