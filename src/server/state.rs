//! Shared state for HTTP handlers.

use std::sync::Arc;

use crate::services::TrackingService;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lookup service shared across requests
    pub service: Arc<TrackingService>,
}

impl AppState {
    pub fn new(service: Arc<TrackingService>) -> Self {
        Self { service }
    }
}
