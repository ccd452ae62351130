//! Read-side projections: leaderboards, fame totals, live guild profile.
//!
//! Leaderboards and fame are computed from stored events only. The guild
//! profile is fetched from the remote service on every call and never
//! cached.

use killboard_db::KillboardStore;
use killboard_remote::RemoteSource;
use killboard_types::{Binding, GuildFilter, GuildId, GuildProfile, KillerTally, ScopeId};
use serde::Serialize;

use crate::error::TrackerError;
use crate::reconcile::require_binding;

/// Default number of leaderboard rows.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Which events a leaderboard or fame total covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardTarget {
    /// The guild bound to one scope.
    Scope(ScopeId),
    /// Every bound guild.
    Global,
}

/// A ranked kill leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    /// The binding for a scoped board; `None` for the global board.
    pub binding: Option<Binding>,
    /// Killers by kill count, highest first, ties by name.
    pub entries: Vec<KillerTally>,
    /// Total kill fame over the same events.
    pub total_fame: i64,
}

/// Answers leaderboard, fame and profile queries.
#[derive(Debug, Clone)]
pub struct Aggregator<S, R> {
    remote: S,
    store: R,
}

impl<S: RemoteSource, R: KillboardStore> Aggregator<S, R> {
    /// Create an aggregator.
    pub const fn new(remote: S, store: R) -> Self {
        Self { remote, store }
    }

    /// Top `n` killers among the guild's members, by kill count.
    ///
    /// `n == 0` yields an empty list.
    pub async fn top_killers_by_guild(
        &self,
        guild: &GuildId,
        n: u32,
    ) -> Result<Vec<KillerTally>, TrackerError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .top_killers(&GuildFilter::Guild(guild.clone()), n)
            .await?)
    }

    /// Sum of kill fame the guild's members scored. `0` when there are none.
    pub async fn total_fame(&self, guild: &GuildId) -> Result<i64, TrackerError> {
        Ok(self
            .store
            .total_fame(&GuildFilter::Guild(guild.clone()))
            .await?)
    }

    /// Live statistics for the guild bound to `scope`.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NoBinding`] when the scope has no binding; remote
    /// failures otherwise.
    pub async fn guild_profile(&self, scope: &ScopeId) -> Result<GuildProfile, TrackerError> {
        let binding = require_binding(&self.store, scope).await?;
        let profile = self.remote.fetch_guild_profile(&binding.external_id).await?;
        tracing::debug!(scope = %scope, guild = %binding.external_id, "Fetched guild profile");
        Ok(profile)
    }

    /// Top `n` killers for `target`, with the total fame of the same events.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NoBinding`] for a scope without a binding.
    pub async fn leaderboard(
        &self,
        target: &LeaderboardTarget,
        n: u32,
    ) -> Result<Leaderboard, TrackerError> {
        let (binding, filter) = self.resolve(target).await?;

        let entries = if n == 0 {
            Vec::new()
        } else {
            self.store.top_killers(&filter, n).await?
        };
        let total_fame = self.store.total_fame(&filter).await?;

        Ok(Leaderboard {
            binding,
            entries,
            total_fame,
        })
    }

    /// Total kill fame for `target`.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NoBinding`] for a scope without a binding.
    pub async fn total_fame_for(&self, target: &LeaderboardTarget) -> Result<i64, TrackerError> {
        let (_, filter) = self.resolve(target).await?;
        Ok(self.store.total_fame(&filter).await?)
    }

    async fn resolve(
        &self,
        target: &LeaderboardTarget,
    ) -> Result<(Option<Binding>, GuildFilter), TrackerError> {
        match target {
            LeaderboardTarget::Scope(scope) => {
                let binding = require_binding(&self.store, scope).await?;
                let filter = GuildFilter::Guild(binding.external_id.clone());
                Ok((Some(binding), filter))
            }
            LeaderboardTarget::Global => Ok((None, GuildFilter::AllBound)),
        }
    }
}
