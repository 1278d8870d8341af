//! Shared application state.

use seacow_runtime::Orchestrator;

/// Shared application state accessible from all route handlers.
///
/// Everything in here is read-only once built; requests never share
/// mutable data.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}
