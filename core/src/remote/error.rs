//! Error types for remote service calls

use thiserror::Error;

/// Errors talking to the boss/user service
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{url}' is not a usable service URL")]
    InvalidUrl { url: String },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("user '{user_id}' not found")]
    UnknownUser { user_id: String },

    #[error("service unavailable: {reason}")]
    Unavailable { reason: String },
}

impl RemoteError {
    /// Classify a reqwest failure for the given URL
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            RemoteError::Timeout {
                url: url.to_string(),
            }
        } else if source.is_decode() {
            RemoteError::Decode {
                url: url.to_string(),
                source,
            }
        } else if let Some(status) = source.status() {
            RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            RemoteError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}
