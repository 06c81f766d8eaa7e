use crate::session::SessionOrchestrator;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: SessionOrchestrator,
}

impl AppState {
    pub fn new(orchestrator: SessionOrchestrator) -> Self {
        Self { orchestrator }
    }
}
