//! Shared runtime state for mesa-server.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The store is held as a
//! trait object so scenario tests can swap in `mesa-testkit`'s in-memory
//! implementation without touching the router.

use std::sync::Arc;

use mesa_core::OrderStore;

/// Static build metadata included in the health response.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            build: BuildInfo {
                service: "mesa-server",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}
