mod config;
mod error;

pub use config::{AppConfig, AppConfigExt, SelectionMode};
pub use error::ConfigError;
