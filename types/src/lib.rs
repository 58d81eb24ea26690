//! Shared configuration types for Boss Rush
//!
//! This crate contains serializable configuration types that are shared between
//! the encounter engine (bossrush-core) and its front-ends (bossrush-cli).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Boss Selection
// ─────────────────────────────────────────────────────────────────────────────

/// How the next boss is chosen once the current one is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Uniformly random pick from the catalog
    #[default]
    Random,
    /// Walk the catalog in order, wrapping around after the last boss
    Sequential,
}

impl SelectionMode {
    pub fn label(&self) -> &'static str {
        match self {
            SelectionMode::Random => "random",
            SelectionMode::Sequential => "sequential",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Persisted application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the boss/user service (no trailing slash required)
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Remote user whose attack power and rewards are used
    #[serde(default)]
    pub user_id: String,
    /// Upper bound on every remote call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub selection: SelectionMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            user_id: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            selection: SelectionMode::default(),
        }
    }
}

impl AppConfig {
    pub fn with_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Service URL without a trailing slash, ready for path joining
    pub fn base_url(&self) -> &str {
        self.service_url.trim_end_matches('/')
    }

    pub fn has_user(&self) -> bool {
        !self.user_id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("user_id = \"42\"").unwrap();
        assert_eq!(config.user_id, "42");
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.selection, SelectionMode::Random);
    }

    #[test]
    fn selection_mode_uses_snake_case() {
        let config: AppConfig = toml::from_str("selection = \"sequential\"").unwrap();
        assert_eq!(config.selection, SelectionMode::Sequential);
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = AppConfig {
            service_url: "https://example.test/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "https://example.test/api");
    }

    #[test]
    fn blank_user_is_not_configured() {
        assert!(!AppConfig::with_user("  ").has_user());
        assert!(AppConfig::with_user("u-1").has_user());
    }
}
