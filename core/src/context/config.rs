//! Application configuration
//!
//! This module re-exports the shared config types from bossrush-types and
//! provides persistence for AppConfig.

pub use bossrush_types::{AppConfig, SelectionMode};

use super::ConfigError;

const APP_NAME: &str = "bossrush";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    /// Load the stored config, falling back to defaults if it is missing or unreadable
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    /// Point at a different service, rejecting anything that is not http(s)
    fn set_service_url(&mut self, url: &str) -> Result<(), ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn set_service_url(&mut self, url: &str) -> Result<(), ConfigError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
            });
        }
        self.service_url = url.trim_end_matches('/').to_string();
        Ok(())
    }
}
