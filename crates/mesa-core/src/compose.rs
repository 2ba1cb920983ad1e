//! Order composition: submission shape validation and pricing.
//!
//! The composer works in two phases so persistence can stay dumb:
//!
//! 1. [`validate_create_request`] — pure shape checks on the incoming lines,
//!    run before any catalog lookup.
//! 2. Per-line pricing by the store: resolve [`SubmissionLine::priced_ref`]
//!    against the catalog, capture the current unit price into a
//!    [`PricedLine`], and total with [`order_total`]. The captured price is a
//!    point-in-time snapshot; later catalog edits never change an order.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

// ---------------------------------------------------------------------------
// SubmissionLine
// ---------------------------------------------------------------------------

/// One flat line of an order submission, as produced by the cart normalizer
/// or sent directly by an API client.
///
/// A line may carry both ids: a normalized set-menu constituent keeps the
/// constituent `menu_item_id` *and* its owning `set_menu_id` for provenance.
/// The set menu, when present, is always the priced reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionLine {
    pub menu_item_id: Option<i64>,
    pub set_menu_id: Option<i64>,
    pub quantity: i64,
    pub note: Option<String>,
}

/// Which catalog row prices a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricedRef {
    MenuItem(i64),
    SetMenu(i64),
}

impl SubmissionLine {
    /// The priced reference: the set menu when present, else the menu item.
    /// `None` means the line references nothing and is invalid.
    pub fn priced_ref(&self) -> Option<PricedRef> {
        match (self.set_menu_id, self.menu_item_id) {
            (Some(set_id), _) => Some(PricedRef::SetMenu(set_id)),
            (None, Some(item_id)) => Some(PricedRef::MenuItem(item_id)),
            (None, None) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Shape validation
// ---------------------------------------------------------------------------

/// Validate an order submission before any catalog lookup or persistence.
///
/// Returns the customer id on success.
pub fn validate_create_request(
    customer_id: Option<i64>,
    lines: &[SubmissionLine],
) -> Result<i64, OrderError> {
    let customer_id = match customer_id {
        Some(id) if !lines.is_empty() => id,
        _ => {
            return Err(OrderError::invalid_input(
                "Customer ID and order items are required",
            ))
        }
    };

    for line in lines {
        if line.quantity <= 0 {
            return Err(OrderError::invalid_input(
                "Each order item requires a positive quantity",
            ));
        }
        if line.priced_ref().is_none() {
            return Err(OrderError::invalid_input(
                "Each order item must reference a menu item or a set menu",
            ));
        }
    }

    Ok(customer_id)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// A submission line with its unit price captured from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub menu_item_id: Option<i64>,
    pub set_menu_id: Option<i64>,
    pub quantity: i64,
    /// Unit price snapshot taken at validation time, persisted verbatim.
    pub unit_price: f64,
    pub note: Option<String>,
}

impl PricedLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// The authoritative order total: `Σ unit_price * quantity`.
pub fn order_total(lines: &[PricedLine]) -> f64 {
    lines.iter().map(PricedLine::line_total).sum()
}

/// Caller-facing NotFound for a missing menu item.
pub fn menu_item_not_found(id: i64) -> OrderError {
    OrderError::not_found(format!("Menu item with ID {id} not found"))
}

/// Caller-facing NotFound for a missing set menu.
pub fn set_menu_not_found(id: i64) -> OrderError {
    OrderError::not_found(format!("Set menu with ID {id} not found"))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
