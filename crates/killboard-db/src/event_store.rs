//! Kill event persistence (`events` table).
//!
//! Events are immutable once stored. `event_id` is the primary key, so an
//! insert of an already-known id is reported as [`DbError::Conflict`] and
//! never produces a second row. Aggregation queries also live here since
//! they only read this table (joined with `guilds` for the global filter).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use killboard_types::{
    EventId, GuildFilter, GuildId, KillEvent, KillerTally, Participant, PlayerId,
};
use sqlx::PgPool;

use crate::error::DbError;

/// Columns selected for every event query.
const EVENT_COLUMNS: &str = "event_id, timestamp, kill_fame, kill_area, \
     killer_id, killer_name, killer_guild_id, killer_avg_power, \
     victim_id, victim_name, victim_guild_id, victim_avg_power";

/// Operations on the `events` table.
pub struct EventStore<'a> {
    pool: &'a PgPool,
}

impl<'a> EventStore<'a> {
    /// Create a new event store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one event.
    ///
    /// Uses `ON CONFLICT DO NOTHING` so a duplicate never aborts a
    /// surrounding transaction; zero affected rows is reported as a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conflict`] if `event_id` is already stored,
    /// otherwise [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, event: &KillEvent) -> Result<(), DbError> {
        let result = sqlx::query(
            r"INSERT INTO events (event_id, timestamp, kill_fame, kill_area,
                                  killer_id, killer_name, killer_guild_id, killer_avg_power,
                                  victim_id, victim_name, victim_guild_id, victim_avg_power)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
              ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event.event_id.as_str())
        .bind(event.timestamp)
        .bind(event.kill_fame)
        .bind(&event.kill_area)
        .bind(event.killer.id.as_str())
        .bind(&event.killer.name)
        .bind(event.killer.guild_id.as_ref().map(GuildId::as_str))
        .bind(event.killer.avg_item_power)
        .bind(event.victim.id.as_str())
        .bind(&event.victim.name)
        .bind(event.victim.guild_id.as_ref().map(GuildId::as_str))
        .bind(event.victim.avg_item_power)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::Conflict(format!("event {} already exists", event.event_id)));
        }
        Ok(())
    }

    /// The most recent events involving a guild on either side.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_recent(
        &self,
        external_id: &GuildId,
        limit: u32,
    ) -> Result<Vec<KillEvent>, DbError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE killer_guild_id = $1 OR victim_guild_id = $1
             ORDER BY timestamp DESC, event_id DESC
             LIMIT $2"
        ))
        .bind(external_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(EventRow::into_event).collect())
    }

    /// Delete every event involving a guild.
    ///
    /// Rows whose other side belongs to a different bound guild are kept;
    /// they still count toward that guild's aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_by_guild(&self, external_id: &GuildId) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"DELETE FROM events e
              WHERE (e.killer_guild_id = $1 OR e.victim_guild_id = $1)
                AND NOT EXISTS (
                    SELECT 1 FROM guilds g
                    WHERE g.external_id <> $1
                      AND (g.external_id = e.killer_guild_id OR g.external_id = e.victim_guild_id)
                )",
        )
        .bind(external_id.as_str())
        .execute(self.pool)
        .await?;

        tracing::debug!(guild = %external_id, rows = result.rows_affected(), "Deleted guild events");
        Ok(result.rows_affected())
    }

    /// Delete the events a killer scored for a guild.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_by_killer(
        &self,
        external_id: &GuildId,
        killer: &PlayerId,
    ) -> Result<u64, DbError> {
        let result =
            sqlx::query("DELETE FROM events WHERE killer_guild_id = $1 AND killer_id = $2")
                .bind(external_id.as_str())
                .bind(killer.as_str())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Distinct killer ids over the events a guild scored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn distinct_killers(
        &self,
        external_id: &GuildId,
    ) -> Result<BTreeSet<PlayerId>, DbError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT killer_id FROM events WHERE killer_guild_id = $1")
                .bind(external_id.as_str())
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| PlayerId::from(id)).collect())
    }

    /// Kill counts grouped by killer name.
    ///
    /// Ordered by count descending, then name ascending so ties are stable
    /// across calls.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn top_killers(
        &self,
        filter: &GuildFilter,
        limit: u32,
    ) -> Result<Vec<KillerTally>, DbError> {
        let query = format!(
            "SELECT killer_name, COUNT(*) AS kills FROM events
             WHERE {}
             GROUP BY killer_name
             ORDER BY kills DESC, killer_name ASC
             LIMIT $1",
            filter_clause(filter, 2)
        );
        let mut q = sqlx::query_as::<_, (String, i64)>(&query).bind(i64::from(limit));
        if let GuildFilter::Guild(id) = filter {
            q = q.bind(id.as_str());
        }
        let rows = q.fetch_all(self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|(name, kills)| KillerTally { name, kills })
            .collect())
    }

    /// Sum of `kill_fame` over the events matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn total_fame(&self, filter: &GuildFilter) -> Result<i64, DbError> {
        // SUM(BIGINT) is NUMERIC in PostgreSQL; cast back and default to 0.
        let query = format!(
            "SELECT COALESCE(SUM(kill_fame), 0)::BIGINT FROM events WHERE {}",
            filter_clause(filter, 1)
        );
        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        if let GuildFilter::Guild(id) = filter {
            q = q.bind(id.as_str());
        }
        let (total,) = q.fetch_one(self.pool).await?;

        Ok(total)
    }
}

/// `WHERE` predicate for a [`GuildFilter`], using placeholder `$param`.
fn filter_clause(filter: &GuildFilter, param: u8) -> String {
    match filter {
        GuildFilter::Guild(_) => format!("killer_guild_id = ${param}"),
        GuildFilter::AllBound => {
            "killer_guild_id IN (SELECT DISTINCT external_id FROM guilds)".to_owned()
        }
    }
}

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EventRow {
    event_id: String,
    timestamp: DateTime<Utc>,
    kill_fame: i64,
    kill_area: String,
    killer_id: String,
    killer_name: String,
    killer_guild_id: Option<String>,
    killer_avg_power: f64,
    victim_id: String,
    victim_name: String,
    victim_guild_id: Option<String>,
    victim_avg_power: f64,
}

impl EventRow {
    fn into_event(self) -> KillEvent {
        KillEvent {
            event_id: EventId::from(self.event_id),
            timestamp: self.timestamp,
            kill_fame: self.kill_fame,
            kill_area: self.kill_area,
            killer: Participant {
                id: PlayerId::from(self.killer_id),
                name: self.killer_name,
                guild_id: self.killer_guild_id.map(GuildId::from),
                avg_item_power: self.killer_avg_power,
            },
            victim: Participant {
                id: PlayerId::from(self.victim_id),
                name: self.victim_name,
                guild_id: self.victim_guild_id.map(GuildId::from),
                avg_item_power: self.victim_avg_power,
            },
        }
    }
}
