//! Error type for the `killboard` binary.

use killboard_core::TrackerError;
use killboard_db::DbError;
use killboard_remote::RemoteError;

use crate::config::ConfigError;

/// Errors that end a CLI invocation.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A tracker operation failed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// The command did not finish within `sync.command_timeout_secs`.
    #[error("command timed out: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
}

impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        Self::Tracker(err.into())
    }
}

impl From<RemoteError> for CliError {
    fn from(err: RemoteError) -> Self {
        Self::Tracker(err.into())
    }
}

impl CliError {
    /// Message printed to the user; details go to the log.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration is invalid. Check killboard.yaml and the environment.",
            Self::Tracker(err) => err.user_message(),
            Self::Timeout(_) => "The request took too long. Please try again later.",
        }
    }
}
