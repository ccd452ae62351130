//! The remote data seam.
//!
//! [`RemoteSource`] abstracts the four read endpoints the tracker needs.
//! The reconciliation engine is generic over it, so tests can script
//! responses without a network, and [`RetryingSource`](crate::RetryingSource)
//! can wrap any implementation.

use std::future::Future;

use killboard_types::{GuildId, GuildProfile, GuildSummary, RawEvent, RawMember};

use crate::error::RemoteError;

/// Default number of events fetched per sync.
pub const DEFAULT_EVENT_LIMIT: u32 = 51;

/// One page of the remote event feed.
///
/// Only the most recent page is reconciled per run; there is no backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPage {
    /// Maximum number of events returned.
    pub limit: u32,
    /// Number of most-recent events to skip.
    pub offset: u32,
}

impl EventPage {
    /// The most recent `limit` events.
    pub const fn latest(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }
}

impl Default for EventPage {
    fn default() -> Self {
        Self::latest(DEFAULT_EVENT_LIMIT)
    }
}

/// Read-only access to the remote game API.
///
/// None of these calls mutate remote state. Each call is a single request
/// that returns one result or one [`RemoteError`].
pub trait RemoteSource: Send + Sync {
    /// Find a guild by name. Returns the first match.
    ///
    /// Fails with [`RemoteError::NotFound`] when nothing matches.
    fn lookup_guild_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<GuildSummary, RemoteError>> + Send;

    /// Fetch one page of the guild's recent kill/death events.
    fn fetch_recent_events(
        &self,
        guild: &GuildId,
        page: EventPage,
    ) -> impl Future<Output = Result<Vec<RawEvent>, RemoteError>> + Send;

    /// Fetch the guild's current member roster.
    fn fetch_roster(
        &self,
        guild: &GuildId,
    ) -> impl Future<Output = Result<Vec<RawMember>, RemoteError>> + Send;

    /// Fetch live guild statistics.
    fn fetch_guild_profile(
        &self,
        guild: &GuildId,
    ) -> impl Future<Output = Result<GuildProfile, RemoteError>> + Send;
}
