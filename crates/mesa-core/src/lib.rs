//! mesa-core
//!
//! Pure domain logic for the order composition & fulfillment engine.
//! No I/O lives here: cart normalization, submission validation and pricing,
//! the fulfillment state machine, refund-workflow preconditions, and the
//! [`store::OrderStore`] persistence seam implemented by `mesa-db` (Postgres)
//! and `mesa-testkit` (in-memory).

pub mod cart;
pub mod compose;
pub mod error;
pub mod refund;
pub mod status;
pub mod store;
pub mod view;

pub use compose::{PricedLine, PricedRef, SubmissionLine};
pub use error::OrderError;
pub use status::{OrderStatus, RefundStatus};
pub use store::{OrderScope, OrderStore};
pub use view::{OrderLineView, OrderReceipt, OrderView, SetMenuItemView};
