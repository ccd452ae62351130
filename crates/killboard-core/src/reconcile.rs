//! Reconciliation engine.
//!
//! Brings the local event store in line with the remote service for one
//! bound scope at a time. Two passes exist:
//!
//! - [`Reconciler::sync_events`] pulls the most recent page of remote
//!   events and inserts the ones not already stored.
//! - [`Reconciler::sync_members`] fetches the live roster and deletes the
//!   stored kills of players who have left the guild.
//!
//! Both passes are safe to re-run. A failure on one row is logged and
//! recorded in the report; the rest of the batch still runs.

use std::collections::HashSet;

use killboard_db::KillboardStore;
use killboard_remote::{EventPage, RemoteSource};
use killboard_types::{Binding, EventId, GuildId, NewBinding, PlayerId, ScopeId};
use serde::Serialize;

use crate::error::TrackerError;
use crate::outcome::BatchOutcome;

/// Default number of stored events consulted for dedup.
pub const DEFAULT_KNOWN_WINDOW: u32 = 100;

/// How much history an event sync looks at.
///
/// The remote feed is only read one page deep (`event_page`), and the
/// dedup set is built from the `known_window` most recent stored events
/// rather than full history. An event older than that window that shows up
/// again in the remote page falls through to the store's unique key on
/// `event_id`, which rejects it as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Remote page fetched per sync.
    pub event_page: EventPage,
    /// Number of recent stored events loaded into the dedup set.
    pub known_window: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            event_page: EventPage::default(),
            known_window: DEFAULT_KNOWN_WINDOW,
        }
    }
}

/// Result of [`Reconciler::sync_events`].
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Guild that was synced.
    pub guild: GuildId,
    /// Events returned by the remote page.
    pub fetched: usize,
    /// Per-event outcome. Applied items are the inserted event ids.
    pub outcome: BatchOutcome<EventId>,
}

impl SyncReport {
    /// Number of events inserted by this run.
    pub fn inserted(&self) -> usize {
        self.outcome.applied_count()
    }
}

/// Result of [`Reconciler::sync_members`].
#[derive(Debug, Clone, Serialize)]
pub struct PruneReport {
    /// Guild that was pruned.
    pub guild: GuildId,
    /// Members on the live roster.
    pub roster_size: usize,
    /// Per-player outcome. Applied items are departed killer ids.
    pub outcome: BatchOutcome<PlayerId>,
    /// Event rows deleted across all departed players.
    pub rows_deleted: u64,
}

impl PruneReport {
    /// Number of departed players whose events were removed.
    pub fn removed(&self) -> usize {
        self.outcome.applied_count()
    }
}

/// Result of [`Reconciler::unbind`].
#[derive(Debug, Clone, Serialize)]
pub struct UnbindReport {
    /// The binding that was removed.
    pub binding: Binding,
    /// Event rows deleted with it.
    pub events_deleted: u64,
}

/// Look up the binding for `scope`, failing with [`TrackerError::NoBinding`].
pub(crate) async fn require_binding<R: KillboardStore>(
    store: &R,
    scope: &ScopeId,
) -> Result<Binding, TrackerError> {
    if scope.is_blank() {
        return Err(TrackerError::InvalidInput("scope id is empty".to_owned()));
    }
    store
        .find_binding_by_scope(scope)
        .await?
        .ok_or_else(|| TrackerError::NoBinding(scope.clone()))
}

/// Keeps the local store in sync with the remote service.
///
/// Generic over both seams so tests can run it against
/// [`MemoryStore`](killboard_db::MemoryStore) and a scripted source.
#[derive(Debug, Clone)]
pub struct Reconciler<S, R> {
    remote: S,
    store: R,
    settings: SyncSettings,
}

impl<S: RemoteSource, R: KillboardStore> Reconciler<S, R> {
    /// Create a reconciler with default [`SyncSettings`].
    pub fn new(remote: S, store: R) -> Self {
        Self {
            remote,
            store,
            settings: SyncSettings::default(),
        }
    }

    /// Replace the sync settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: SyncSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current sync settings.
    pub const fn settings(&self) -> SyncSettings {
        self.settings
    }

    /// The store this reconciler writes to.
    pub const fn store(&self) -> &R {
        &self.store
    }

    /// Bind `scope` to the remote guild named `guild_name`.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::InvalidInput`] for a blank name or scope
    /// - [`TrackerError::RemoteNotFound`] when no guild matches
    /// - [`TrackerError::AlreadyBound`] when the scope already has a binding
    pub async fn bind(&self, scope: &ScopeId, guild_name: &str) -> Result<Binding, TrackerError> {
        let guild_name = guild_name.trim();
        if guild_name.is_empty() {
            return Err(TrackerError::InvalidInput("guild name is empty".to_owned()));
        }
        if scope.is_blank() {
            return Err(TrackerError::InvalidInput("scope id is empty".to_owned()));
        }

        let summary = self.remote.lookup_guild_by_name(guild_name).await?;

        if self.store.find_binding(&summary.id, scope).await?.is_some() {
            return Err(TrackerError::AlreadyBound {
                scope: scope.clone(),
                guild: summary.id,
            });
        }

        let new = NewBinding {
            external_id: summary.id,
            scope_id: scope.clone(),
            name: summary.name,
            death_fame: summary.death_fame,
        };

        match self.store.insert_binding(&new).await {
            Ok(binding) => {
                tracing::info!(
                    scope = %scope,
                    guild = %binding.external_id,
                    name = %binding.name,
                    "Guild bound"
                );
                Ok(binding)
            }
            Err(err) if err.is_conflict() => Err(TrackerError::AlreadyBound {
                scope: scope.clone(),
                guild: new.external_id,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove the binding for `scope` and the events stored for its guild.
    ///
    /// Events are kept when another scope still tracks the same guild, and
    /// so are rows whose other side belongs to a different bound guild.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NoBinding`] when the scope has no binding.
    pub async fn unbind(&self, scope: &ScopeId) -> Result<UnbindReport, TrackerError> {
        let binding = require_binding(&self.store, scope).await?;
        let guild = &binding.external_id;

        let bound_scopes = self.store.count_bindings_for_guild(guild).await?;
        let events_deleted = if bound_scopes <= 1 {
            self.store.delete_events_by_guild(guild).await?
        } else {
            tracing::debug!(guild = %guild, bound_scopes, "Guild still tracked elsewhere, keeping events");
            0
        };

        if !self.store.delete_binding(scope).await? {
            return Err(TrackerError::NoBinding(scope.clone()));
        }

        tracing::info!(scope = %scope, guild = %guild, events_deleted, "Guild unbound");
        Ok(UnbindReport {
            binding,
            events_deleted,
        })
    }

    /// Insert remote events the store does not have yet.
    ///
    /// Remote order is preserved. Duplicates inside one remote page are
    /// inserted once.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NoBinding`] when the scope has no binding, or a
    /// remote/store error from the fetch steps. Per-event insert failures
    /// are reported in [`SyncReport::outcome`] instead.
    pub async fn sync_events(&self, scope: &ScopeId) -> Result<SyncReport, TrackerError> {
        let binding = require_binding(&self.store, scope).await?;
        let guild = binding.external_id;

        let remote = self
            .remote
            .fetch_recent_events(&guild, self.settings.event_page)
            .await?;
        let fetched = remote.len();

        let mut known: HashSet<EventId> = self
            .store
            .list_recent_events(&guild, self.settings.known_window)
            .await?
            .into_iter()
            .map(|e| e.event_id)
            .collect();

        let mut outcome = BatchOutcome::new();
        for raw in remote {
            let event = raw.into_kill_event();
            if !known.insert(event.event_id.clone()) {
                outcome.unchanged();
                continue;
            }

            match self.store.insert_event(&event).await {
                Ok(()) => outcome.applied(event.event_id),
                Err(err) if err.is_conflict() => {
                    tracing::debug!(event_id = %event.event_id, "Event already stored");
                    outcome.unchanged();
                }
                Err(err) => {
                    tracing::warn!(
                        guild = %guild,
                        event_id = %event.event_id,
                        error = %err,
                        "Failed to store event, skipping"
                    );
                    outcome.skipped(&event.event_id, &err);
                }
            }
        }

        tracing::info!(
            scope = %scope,
            guild = %guild,
            fetched,
            inserted = outcome.applied_count(),
            skipped = outcome.skipped_items().len(),
            "Event sync finished"
        );

        Ok(SyncReport {
            guild,
            fetched,
            outcome,
        })
    }

    /// Delete stored kills of players no longer on the guild roster.
    ///
    /// Only the killer side is considered. Events where a departed player
    /// was the victim stay.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NoBinding`] when the scope has no binding, or a
    /// remote/store error from the fetch steps. Per-player delete failures
    /// are reported in [`PruneReport::outcome`] instead.
    pub async fn sync_members(&self, scope: &ScopeId) -> Result<PruneReport, TrackerError> {
        let binding = require_binding(&self.store, scope).await?;
        let guild = binding.external_id;

        let roster: HashSet<PlayerId> = self
            .remote
            .fetch_roster(&guild)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        let departed: Vec<PlayerId> = self
            .store
            .distinct_killer_ids(&guild)
            .await?
            .into_iter()
            .filter(|id| !roster.contains(id))
            .collect();

        let mut outcome = BatchOutcome::new();
        let mut rows_deleted: u64 = 0;
        for player in departed {
            match self.store.delete_events_by_killer(&guild, &player).await {
                Ok(rows) => {
                    tracing::debug!(guild = %guild, player = %player, rows, "Pruned departed member");
                    rows_deleted = rows_deleted.saturating_add(rows);
                    outcome.applied(player);
                }
                Err(err) => {
                    tracing::warn!(
                        guild = %guild,
                        player = %player,
                        error = %err,
                        "Failed to prune departed member, skipping"
                    );
                    outcome.skipped(&player, &err);
                }
            }
        }

        tracing::info!(
            scope = %scope,
            guild = %guild,
            roster = roster.len(),
            removed = outcome.applied_count(),
            rows_deleted,
            "Member sync finished"
        );

        Ok(PruneReport {
            guild,
            roster_size: roster.len(),
            outcome,
            rows_deleted,
        })
    }
}
