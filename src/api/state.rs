use crate::service::PosterService;
use std::sync::Arc;

/// Shared application state accessible to all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PosterService>,
}

impl AppState {
    pub fn new(service: PosterService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
