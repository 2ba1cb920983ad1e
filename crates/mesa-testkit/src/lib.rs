//! mesa-testkit
//!
//! Deterministic in-memory [`mesa_core::OrderStore`] for scenario tests.
//! No network, no database; order ids are sequential from 1. MUST NOT
//! appear in production `[dependencies]` — server tests pull it in via
//! `[dev-dependencies]` only.

pub mod mem_store;

pub use mem_store::MemStore;
