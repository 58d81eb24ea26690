use bossrush_core::{AppConfig, EncounterHandle};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the encounter service.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    pub encounter: EncounterHandle,
    /// Running against the built-in catalog instead of the remote service
    pub offline: bool,
}

impl CliContext {
    pub fn new(config: AppConfig, encounter: EncounterHandle, offline: bool) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            encounter,
            offline,
        }
    }
}
