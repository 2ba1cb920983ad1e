//! Cart normalizer.
//!
//! Collapses a heterogeneous client cart into flat submission lines, merging
//! duplicates by a composite (constituent-item, owning-set-menu) key:
//!
//! - a `Menu` line keys on `(item_id, none)`;
//! - a `Set` line is exploded into its constituent items, each keyed on
//!   `(constituent_id, set_id)` and attributed the *set's* order quantity —
//!   one set purchased means one copy of each constituent recorded against
//!   that set, never multiplied by the constituent's in-set quantity.
//!
//! Quantities sum across merges. An item appearing both standalone and
//! inside a set yields two separate lines: the keys differ, and so does the
//! price provenance. Downstream requires no particular output ordering;
//! emission is first-seen order for determinism.

use std::collections::HashMap;

use crate::compose::SubmissionLine;

// ---------------------------------------------------------------------------
// CartLine
// ---------------------------------------------------------------------------

/// A constituent of a set-menu cart line: per-set composition, not an order
/// quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSetItem {
    pub menu_item_id: i64,
    pub quantity: i64,
}

/// Ephemeral client-held cart entry. Never persisted; exists only to be
/// normalized into the submission payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CartLine {
    /// A standalone menu item or good.
    Menu {
        id: i64,
        price: f64,
        quantity: i64,
        note: Option<String>,
    },
    /// A fixed-price set menu with its constituent items.
    Set {
        set_menu_id: i64,
        name: String,
        price: f64,
        items: Vec<CartSetItem>,
        quantity: i64,
        note: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// normalize_cart
// ---------------------------------------------------------------------------

/// Flatten a cart into quantity-summed submission lines.
///
/// The first non-empty note seen for a key is kept.
pub fn normalize_cart(cart: &[CartLine]) -> Vec<SubmissionLine> {
    let mut index: HashMap<(Option<i64>, Option<i64>), usize> = HashMap::new();
    let mut out: Vec<SubmissionLine> = Vec::new();

    let mut add = |menu_item_id: Option<i64>,
                   set_menu_id: Option<i64>,
                   quantity: i64,
                   note: &Option<String>| {
        let key = (menu_item_id, set_menu_id);
        match index.get(&key) {
            Some(&i) => {
                out[i].quantity += quantity;
                if out[i].note.is_none() {
                    out[i].note = note.clone().filter(|n| !n.trim().is_empty());
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(SubmissionLine {
                    menu_item_id,
                    set_menu_id,
                    quantity,
                    note: note.clone().filter(|n| !n.trim().is_empty()),
                });
            }
        }
    };

    for line in cart {
        match line {
            CartLine::Menu { id, quantity, note, .. } => {
                add(Some(*id), None, *quantity, note);
            }
            CartLine::Set {
                set_menu_id,
                items,
                quantity,
                note,
                ..
            } => {
                if items.is_empty() {
                    // Degenerate set with no composition: keep the priced
                    // reference so the order still charges the set.
                    add(None, Some(*set_menu_id), *quantity, note);
                } else {
                    for item in items {
                        add(Some(item.menu_item_id), Some(*set_menu_id), *quantity, note);
                    }
                }
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(id: i64, qty: i64) -> CartLine {
        CartLine::Menu {
            id,
            price: 10.0,
            quantity: qty,
            note: None,
        }
    }

    fn lunch_set(qty: i64, items: &[(i64, i64)]) -> CartLine {
        CartLine::Set {
            set_menu_id: 9,
            name: "Lunch Set".to_string(),
            price: 18.0,
            items: items
                .iter()
                .map(|&(menu_item_id, quantity)| CartSetItem {
                    menu_item_id,
                    quantity,
                })
                .collect(),
            quantity: qty,
            note: None,
        }
    }

    #[test]
    fn standalone_and_set_copies_are_never_merged() {
        // Standalone item 3 (qty 2) + set containing item 3 (set qty 3):
        // two separate lines, different price provenance.
        let cart = [menu(3, 2), lunch_set(3, &[(3, 1)])];
        let lines = normalize_cart(&cart);

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            SubmissionLine {
                menu_item_id: Some(3),
                set_menu_id: None,
                quantity: 2,
                note: None,
            }
        );
        assert_eq!(
            lines[1],
            SubmissionLine {
                menu_item_id: Some(3),
                set_menu_id: Some(9),
                quantity: 3,
                note: None,
            }
        );
    }

    #[test]
    fn duplicate_menu_lines_sum_quantities() {
        let lines = normalize_cart(&[menu(3, 2), menu(3, 5), menu(4, 1)]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 7);
        assert_eq!(lines[1].menu_item_id, Some(4));
    }

    #[test]
    fn set_quantity_is_attributed_not_multiplied() {
        // Set ordered twice; constituent 4 appears twice per set. The
        // submission line still records quantity 2 (sets ordered), not 4.
        let lines = normalize_cart(&[lunch_set(2, &[(3, 1), (4, 2)])]);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.set_menu_id, Some(9));
            assert_eq!(line.quantity, 2);
        }
    }

    #[test]
    fn two_copies_of_the_same_set_merge() {
        let lines = normalize_cart(&[lunch_set(1, &[(3, 1)]), lunch_set(2, &[(3, 1)])]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
    }

    #[test]
    fn empty_set_keeps_its_priced_reference() {
        let lines = normalize_cart(&[lunch_set(1, &[])]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].menu_item_id, None);
        assert_eq!(lines[0].set_menu_id, Some(9));
    }

    #[test]
    fn first_non_empty_note_wins() {
        let cart = [
            CartLine::Menu {
                id: 3,
                price: 10.0,
                quantity: 1,
                note: None,
            },
            CartLine::Menu {
                id: 3,
                price: 10.0,
                quantity: 1,
                note: Some("no onions".to_string()),
            },
            CartLine::Menu {
                id: 3,
                price: 10.0,
                quantity: 1,
                note: Some("extra spicy".to_string()),
            },
        ];
        let lines = normalize_cart(&cart);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].note.as_deref(), Some("no onions"));
    }

    #[test]
    fn empty_cart_normalizes_to_nothing() {
        assert!(normalize_cart(&[]).is_empty());
    }
}
