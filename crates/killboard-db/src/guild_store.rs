//! Guild binding persistence (`guilds` table).
//!
//! A binding row ties one remote guild to one local scope (`server_id`).
//! Uniqueness of `server_id` and of `(external_id, server_id)` is enforced
//! by the schema, so two concurrent binds cannot both succeed.

use chrono::{DateTime, Utc};
use killboard_types::{Binding, GuildId, NewBinding, ScopeId};
use sqlx::PgPool;

use crate::error::DbError;

/// Columns selected for every binding query.
const BINDING_COLUMNS: &str = "external_id, guild_name, server_id, death_fame, created_at";

/// Operations on the `guilds` table.
pub struct GuildStore<'a> {
    pool: &'a PgPool,
}

impl<'a> GuildStore<'a> {
    /// Create a new guild store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the binding owned by a scope.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn find_by_scope(&self, scope: &ScopeId) -> Result<Option<Binding>, DbError> {
        let row = sqlx::query_as::<_, BindingRow>(&format!(
            "SELECT {BINDING_COLUMNS} FROM guilds WHERE server_id = $1"
        ))
        .bind(scope.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(BindingRow::into_binding))
    }

    /// Find the binding of a guild owned by a scope.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn find(
        &self,
        external_id: &GuildId,
        scope: &ScopeId,
    ) -> Result<Option<Binding>, DbError> {
        let row = sqlx::query_as::<_, BindingRow>(&format!(
            "SELECT {BINDING_COLUMNS} FROM guilds WHERE external_id = $1 AND server_id = $2"
        ))
        .bind(external_id.as_str())
        .bind(scope.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(BindingRow::into_binding))
    }

    /// Insert a binding. `created_at` is set by the database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conflict`] on a unique violation, otherwise
    /// [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, binding: &NewBinding) -> Result<Binding, DbError> {
        let row = sqlx::query_as::<_, BindingRow>(&format!(
            "INSERT INTO guilds (external_id, guild_name, server_id, death_fame)
             VALUES ($1, $2, $3, $4)
             RETURNING {BINDING_COLUMNS}"
        ))
        .bind(binding.external_id.as_str())
        .bind(&binding.name)
        .bind(binding.scope_id.as_str())
        .bind(binding.death_fame)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, &format!("binding for scope {}", binding.scope_id)))?;

        tracing::info!(
            scope = %binding.scope_id,
            guild = %binding.external_id,
            name = %binding.name,
            "Inserted guild binding"
        );

        Ok(row.into_binding())
    }

    /// Delete the binding owned by a scope.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_by_scope(&self, scope: &ScopeId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM guilds WHERE server_id = $1")
            .bind(scope.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count the scopes bound to a guild.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count_for_guild(&self, external_id: &GuildId) -> Result<u64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM guilds WHERE external_id = $1")
            .bind(external_id.as_str())
            .fetch_one(self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// A row from the `guilds` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct BindingRow {
    external_id: String,
    guild_name: String,
    server_id: String,
    death_fame: i64,
    created_at: DateTime<Utc>,
}

impl BindingRow {
    fn into_binding(self) -> Binding {
        Binding {
            external_id: GuildId::from(self.external_id),
            scope_id: ScopeId::from(self.server_id),
            name: self.guild_name,
            death_fame: self.death_fame,
            created_at: self.created_at,
        }
    }
}
