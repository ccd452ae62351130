//! Error types for the event store.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors and singles out unique-key conflicts so callers can
//! treat a duplicate insert as a no-op.

/// Errors that can occur in the event store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An insert violated a unique constraint (duplicate `event_id`, or a
    /// binding that already exists for the scope).
    #[error("row conflict: {0}")]
    Conflict(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Whether this error is a unique-key conflict.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Convert an insert error, mapping unique violations to [`DbError::Conflict`].
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(format!("{what} already exists"))
            }
            other => Self::Postgres(other),
        }
    }
}
