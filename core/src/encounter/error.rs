//! Error types for encounter operations

use std::error::Error as _;

use thiserror::Error;

use crate::remote::RemoteError;

/// Recoverable failures of the combat session.
///
/// None of these are fatal: the session stays in its last stable state and
/// the failed step can be invoked again.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("boss catalog unavailable")]
    CatalogUnavailable(#[source] RemoteError),

    #[error("no bosses available")]
    EmptyCatalog,

    #[error("failed to fetch user snapshot")]
    UserFetchFailed(#[source] RemoteError),

    #[error("reward reconciliation failed")]
    ReconciliationFailed(#[source] RemoteError),

    #[error("a reward reconciliation is already in flight")]
    ReconciliationInFlight,

    #[error("no defeated boss is awaiting reconciliation")]
    NotDefeated,

    #[error("defeated boss still has an uncommitted reward")]
    RewardPending,

    #[error("no user configured")]
    NoUser,

    #[error("resolution belongs to an abandoned encounter")]
    StaleResolution,
}

impl SessionError {
    /// Error message including the remote cause, for presenters
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
