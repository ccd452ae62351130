//! In-process [`KillboardStore`] used by tests and dry runs.
//!
//! Mirrors the `PostgreSQL` schema's constraints: `event_id` is unique,
//! `scope_id` is unique, and `(external_id, scope_id)` is unique. Ordering
//! and tie-breaks match the SQL queries so tests against this store carry
//! over to the real one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use killboard_types::{
    Binding, EventId, GuildFilter, GuildId, KillEvent, KillerTally, NewBinding, PlayerId, ScopeId,
};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::store::KillboardStore;

/// Tables held by a [`MemoryStore`].
#[derive(Debug, Default)]
struct Tables {
    /// Bindings keyed by owning scope.
    bindings: BTreeMap<ScopeId, Binding>,
    /// Events keyed by their unique id.
    events: BTreeMap<EventId, KillEvent>,
}

impl Tables {
    fn matches(&self, event: &KillEvent, filter: &GuildFilter) -> bool {
        match filter {
            GuildFilter::Guild(id) => event.scored_by_guild(id),
            GuildFilter::AllBound => event
                .killer
                .guild_id
                .as_ref()
                .is_some_and(|g| self.bindings.values().any(|b| &b.external_id == g)),
        }
    }
}

/// A cloneable in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub async fn event_count(&self) -> usize {
        self.tables.read().await.events.len()
    }

    /// Whether an event with this id is stored.
    pub async fn contains_event(&self, event_id: &str) -> bool {
        self.tables.read().await.events.contains_key(event_id)
    }

    /// Number of stored bindings.
    pub async fn binding_count(&self) -> usize {
        self.tables.read().await.bindings.len()
    }
}

impl KillboardStore for MemoryStore {
    async fn find_binding_by_scope(&self, scope: &ScopeId) -> Result<Option<Binding>, DbError> {
        Ok(self.tables.read().await.bindings.get(scope).cloned())
    }

    async fn find_binding(
        &self,
        external_id: &GuildId,
        scope: &ScopeId,
    ) -> Result<Option<Binding>, DbError> {
        Ok(self
            .tables
            .read()
            .await
            .bindings
            .get(scope)
            .filter(|b| &b.external_id == external_id)
            .cloned())
    }

    async fn insert_binding(&self, binding: &NewBinding) -> Result<Binding, DbError> {
        let mut tables = self.tables.write().await;
        if tables.bindings.contains_key(&binding.scope_id) {
            return Err(DbError::Conflict(format!(
                "binding for scope {} already exists",
                binding.scope_id
            )));
        }

        let stored = Binding {
            external_id: binding.external_id.clone(),
            scope_id: binding.scope_id.clone(),
            name: binding.name.clone(),
            death_fame: binding.death_fame,
            created_at: Utc::now(),
        };
        tables
            .bindings
            .insert(binding.scope_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete_binding(&self, scope: &ScopeId) -> Result<bool, DbError> {
        Ok(self.tables.write().await.bindings.remove(scope).is_some())
    }

    async fn count_bindings_for_guild(&self, external_id: &GuildId) -> Result<u64, DbError> {
        let tables = self.tables.read().await;
        let count = tables
            .bindings
            .values()
            .filter(|b| &b.external_id == external_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn delete_events_by_guild(&self, external_id: &GuildId) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        let others: BTreeSet<GuildId> = tables
            .bindings
            .values()
            .map(|b| b.external_id.clone())
            .filter(|g| g != external_id)
            .collect();
        let before = tables.events.len();
        tables.events.retain(|_, e| {
            let shared = [&e.killer.guild_id, &e.victim.guild_id]
                .into_iter()
                .flatten()
                .any(|g| others.contains(g));
            !e.involves_guild(external_id) || shared
        });
        let removed = before.saturating_sub(tables.events.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn list_recent_events(
        &self,
        external_id: &GuildId,
        limit: u32,
    ) -> Result<Vec<KillEvent>, DbError> {
        let tables = self.tables.read().await;
        let mut events: Vec<KillEvent> = tables
            .events
            .values()
            .filter(|e| e.involves_guild(external_id))
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.event_id.cmp(&a.event_id))
        });
        events.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(events)
    }

    async fn insert_event(&self, event: &KillEvent) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        if tables.events.contains_key(&event.event_id) {
            return Err(DbError::Conflict(format!(
                "event {} already exists",
                event.event_id
            )));
        }
        tables.events.insert(event.event_id.clone(), event.clone());
        Ok(())
    }

    async fn delete_events_by_killer(
        &self,
        external_id: &GuildId,
        killer: &PlayerId,
    ) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        let before = tables.events.len();
        tables
            .events
            .retain(|_, e| !(e.scored_by_guild(external_id) && &e.killer.id == killer));
        let removed = before.saturating_sub(tables.events.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn distinct_killer_ids(
        &self,
        external_id: &GuildId,
    ) -> Result<BTreeSet<PlayerId>, DbError> {
        Ok(self
            .tables
            .read()
            .await
            .events
            .values()
            .filter(|e| e.scored_by_guild(external_id))
            .map(|e| e.killer.id.clone())
            .collect())
    }

    async fn top_killers(
        &self,
        filter: &GuildFilter,
        limit: u32,
    ) -> Result<Vec<KillerTally>, DbError> {
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for event in tables.events.values().filter(|e| tables.matches(e, filter)) {
            let entry = counts.entry(event.killer.name.as_str()).or_insert(0);
            *entry = entry.saturating_add(1);
        }

        let mut tallies: Vec<KillerTally> = counts
            .into_iter()
            .map(|(name, kills)| KillerTally {
                name: name.to_owned(),
                kills,
            })
            .collect();
        tallies.sort_by(|a, b| b.kills.cmp(&a.kills).then_with(|| a.name.cmp(&b.name)));
        tallies.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(tallies)
    }

    async fn total_fame(&self, filter: &GuildFilter) -> Result<i64, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .values()
            .filter(|e| tables.matches(e, filter))
            .fold(0_i64, |acc, e| acc.saturating_add(e.kill_fame)))
    }
}
