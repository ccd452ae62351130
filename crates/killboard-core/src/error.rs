//! Error taxonomy for tracker operations.
//!
//! [`TrackerError`] is what callers see. Each variant falls into one
//! coarse [`ErrorCategory`], and [`TrackerError::user_message`] gives a
//! sentence safe to show to end users; the `Display` text is for logs.

use killboard_db::DbError;
use killboard_remote::RemoteError;
use killboard_types::{GuildId, ScopeId};

/// Errors returned by the reconciliation engine and aggregation layer.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The remote service could not be queried (network, status, or parse).
    #[error("remote fetch failed: {0}")]
    Remote(RemoteError),

    /// The remote lookup succeeded but matched nothing.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// The operation needs a binding the scope does not have.
    #[error("no guild is bound to scope {0}")]
    NoBinding(ScopeId),

    /// The scope already has a binding (for this guild or another one).
    #[error("guild {guild} cannot be bound to scope {scope}: a binding already exists")]
    AlreadyBound {
        /// Scope that was being bound.
        scope: ScopeId,
        /// Guild that was being bound.
        guild: GuildId,
    },

    /// A persistence operation failed.
    #[error("store error: {0}")]
    Store(#[from] DbError),

    /// The request was malformed (blank name or scope).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<RemoteError> for TrackerError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(what) => Self::RemoteNotFound(what),
            RemoteError::InvalidInput(why) => Self::InvalidInput(why),
            other => Self::Remote(other),
        }
    }
}

/// Coarse failure classes exposed to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Something the user asked about does not exist.
    NotFound,
    /// The thing the user tried to create already exists.
    AlreadyExists,
    /// The user's input was unusable.
    InvalidInput,
    /// Anything else. Details stay in the logs.
    Internal,
}

impl TrackerError {
    /// The coarse category of this error.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::RemoteNotFound(_) | Self::NoBinding(_) => ErrorCategory::NotFound,
            Self::AlreadyBound { .. } => ErrorCategory::AlreadyExists,
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
            Self::Remote(_) | Self::Store(_) => ErrorCategory::Internal,
        }
    }

    /// A generic message that does not leak internals.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NoBinding(_) => {
                "No guild is registered for this server. Please register a guild first."
            }
            Self::RemoteNotFound(_) => {
                "Could not find that guild. Please check the name and try again."
            }
            Self::AlreadyBound { .. } => "A guild is already registered in this server.",
            Self::InvalidInput(_) => "Please provide a valid guild name.",
            Self::Remote(_) | Self::Store(_) => {
                "Something went wrong. Please try again later."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_not_found_is_lifted() {
        let err = TrackerError::from(RemoteError::NotFound("guild \"x\"".to_owned()));
        assert!(matches!(err, TrackerError::RemoteNotFound(_)));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn transport_failure_is_internal_and_does_not_leak() {
        let err = TrackerError::from(RemoteError::Transport("10.0.0.3 refused".to_owned()));
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(!err.user_message().contains("10.0.0.3"));
    }

    #[test]
    fn store_conflict_is_still_internal_by_default() {
        let err = TrackerError::from(DbError::Conflict("event 1 already exists".to_owned()));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
