use super::resolver::VirtualResolver;
use crate::storage::EnvironmentStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn EnvironmentStore>,
    pub virtuals: Arc<VirtualResolver>,
}

impl AppState {
    /// State with the default set of virtual environments
    pub fn new(storage: Arc<dyn EnvironmentStore>) -> Self {
        Self {
            storage,
            virtuals: Arc::new(VirtualResolver::default()),
        }
    }
}
