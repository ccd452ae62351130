//! Shared fixtures: a scripted [`RemoteSource`], a store wrapper that
//! injects failures, and event builders.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use killboard_db::{DbError, KillboardStore, MemoryStore};
use killboard_remote::{EventPage, RemoteError, RemoteSource};
use killboard_types::{
    Binding, EventId, GuildFilter, GuildId, GuildProfile, GuildSummary, KillEvent, KillerTally,
    NewBinding, PlayerId, PvpTotals, RawEvent, RawMember, RawParticipant, ScopeId,
};

// ---------------------------------------------------------------------------
// Scripted remote
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Script {
    guilds: Vec<GuildSummary>,
    events: HashMap<GuildId, Vec<RawEvent>>,
    rosters: HashMap<GuildId, Vec<RawMember>>,
    profiles: HashMap<GuildId, GuildProfile>,
    event_fetches: usize,
}

/// A [`RemoteSource`] answering from canned data. Clones share the script.
#[derive(Debug, Clone, Default)]
pub struct FakeRemote {
    script: Arc<Mutex<Script>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` resolvable to `id`.
    pub fn with_guild(self, id: &str, name: &str) -> Self {
        self.script.lock().unwrap().guilds.push(GuildSummary {
            id: GuildId::new(id),
            name: name.to_owned(),
            death_fame: 1_000,
        });
        self
    }

    /// Replace the event window returned for `guild`.
    pub fn set_events(&self, guild: &str, events: Vec<RawEvent>) {
        self.script
            .lock()
            .unwrap()
            .events
            .insert(GuildId::new(guild), events);
    }

    /// Replace the roster returned for `guild`.
    pub fn set_roster(&self, guild: &str, member_ids: &[&str]) {
        let roster = member_ids
            .iter()
            .map(|id| RawMember {
                id: PlayerId::new(*id),
                name: id.to_uppercase(),
            })
            .collect();
        self.script
            .lock()
            .unwrap()
            .rosters
            .insert(GuildId::new(guild), roster);
    }

    /// Register a profile for `guild` with the given PvP totals.
    pub fn set_profile(&self, guild: &str, kills: i64, deaths: i64) {
        let profile = GuildProfile {
            id: GuildId::new(guild),
            name: format!("Guild {guild}"),
            founder: "Founder".to_owned(),
            member_count: 3,
            kill_fame: 900,
            death_fame: 300,
            pvp: PvpTotals {
                kills,
                deaths,
                fame: 1_200,
            },
            top_players: Vec::new(),
        };
        self.script
            .lock()
            .unwrap()
            .profiles
            .insert(GuildId::new(guild), profile);
    }

    /// How many times the event window was fetched.
    pub fn event_fetches(&self) -> usize {
        self.script.lock().unwrap().event_fetches
    }
}

impl RemoteSource for FakeRemote {
    async fn lookup_guild_by_name(&self, name: &str) -> Result<GuildSummary, RemoteError> {
        self.script
            .lock()
            .unwrap()
            .guilds
            .iter()
            .find(|g| g.name == name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("guild {name:?}")))
    }

    async fn fetch_recent_events(
        &self,
        guild: &GuildId,
        page: EventPage,
    ) -> Result<Vec<RawEvent>, RemoteError> {
        let mut script = self.script.lock().unwrap();
        script.event_fetches += 1;
        let limit = usize::try_from(page.limit).unwrap();
        Ok(script
            .events
            .get(guild)
            .map(|events| events.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_roster(&self, guild: &GuildId) -> Result<Vec<RawMember>, RemoteError> {
        self.script
            .lock()
            .unwrap()
            .rosters
            .get(guild)
            .cloned()
            .ok_or_else(|| RemoteError::Status {
                status: 503,
                body: "roster unavailable".to_owned(),
            })
    }

    async fn fetch_guild_profile(&self, guild: &GuildId) -> Result<GuildProfile, RemoteError> {
        self.script
            .lock()
            .unwrap()
            .profiles
            .get(guild)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("guild {guild}")))
    }
}

// ---------------------------------------------------------------------------
// Failure-injecting store
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryStore`] and fails writes for chosen ids.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing_events: Arc<Mutex<HashSet<String>>>,
    failing_killers: Arc<Mutex<HashSet<String>>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Make `insert_event` fail for `event_id`.
    pub fn fail_event(&self, event_id: &str) {
        self.failing_events
            .lock()
            .unwrap()
            .insert(event_id.to_owned());
    }

    /// Make `delete_events_by_killer` fail for `killer`.
    pub fn fail_killer(&self, killer: &str) {
        self.failing_killers
            .lock()
            .unwrap()
            .insert(killer.to_owned());
    }

    fn injected(what: &str) -> DbError {
        DbError::Config(format!("injected failure: {what}"))
    }
}

impl KillboardStore for FlakyStore {
    async fn find_binding_by_scope(&self, scope: &ScopeId) -> Result<Option<Binding>, DbError> {
        self.inner.find_binding_by_scope(scope).await
    }

    async fn find_binding(
        &self,
        external_id: &GuildId,
        scope: &ScopeId,
    ) -> Result<Option<Binding>, DbError> {
        self.inner.find_binding(external_id, scope).await
    }

    async fn insert_binding(&self, binding: &NewBinding) -> Result<Binding, DbError> {
        self.inner.insert_binding(binding).await
    }

    async fn delete_binding(&self, scope: &ScopeId) -> Result<bool, DbError> {
        self.inner.delete_binding(scope).await
    }

    async fn count_bindings_for_guild(&self, external_id: &GuildId) -> Result<u64, DbError> {
        self.inner.count_bindings_for_guild(external_id).await
    }

    async fn delete_events_by_guild(&self, external_id: &GuildId) -> Result<u64, DbError> {
        self.inner.delete_events_by_guild(external_id).await
    }

    async fn list_recent_events(
        &self,
        external_id: &GuildId,
        limit: u32,
    ) -> Result<Vec<KillEvent>, DbError> {
        self.inner.list_recent_events(external_id, limit).await
    }

    async fn insert_event(&self, event: &KillEvent) -> Result<(), DbError> {
        let fails = self
            .failing_events
            .lock()
            .unwrap()
            .contains(event.event_id.as_str());
        if fails {
            return Err(Self::injected(event.event_id.as_str()));
        }
        self.inner.insert_event(event).await
    }

    async fn delete_events_by_killer(
        &self,
        external_id: &GuildId,
        killer: &PlayerId,
    ) -> Result<u64, DbError> {
        let fails = self
            .failing_killers
            .lock()
            .unwrap()
            .contains(killer.as_str());
        if fails {
            return Err(Self::injected(killer.as_str()));
        }
        self.inner.delete_events_by_killer(external_id, killer).await
    }

    async fn distinct_killer_ids(
        &self,
        external_id: &GuildId,
    ) -> Result<BTreeSet<PlayerId>, DbError> {
        self.inner.distinct_killer_ids(external_id).await
    }

    async fn top_killers(
        &self,
        filter: &GuildFilter,
        limit: u32,
    ) -> Result<Vec<KillerTally>, DbError> {
        self.inner.top_killers(filter, limit).await
    }

    async fn total_fame(&self, filter: &GuildFilter) -> Result<i64, DbError> {
        self.inner.total_fame(filter).await
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Fixed base time so orderings are deterministic.
pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap()
}

fn raw_participant(id: &str, guild: Option<&str>) -> RawParticipant {
    RawParticipant {
        id: PlayerId::new(id),
        name: id.to_uppercase(),
        guild_id: Some(guild.unwrap_or_default().to_owned()),
        average_item_power: 1_100.0,
    }
}

/// A remote event where `killer` of `killer_guild` kills `victim` of `victim_guild`.
pub fn raw_event(
    id: &str,
    minute: u32,
    fame: i64,
    (killer, killer_guild): (&str, Option<&str>),
    (victim, victim_guild): (&str, Option<&str>),
) -> RawEvent {
    RawEvent {
        event_id: EventId::new(id),
        timestamp: at(minute),
        total_victim_kill_fame: fame,
        kill_area: Some("OPEN_WORLD".to_owned()),
        killer: raw_participant(killer, killer_guild),
        victim: raw_participant(victim, victim_guild),
    }
}

/// A stored event where `killer` of `guild` kills an outsider.
pub fn kill(id: &str, minute: u32, fame: i64, killer: &str, guild: &str) -> KillEvent {
    raw_event(id, minute, fame, (killer, Some(guild)), ("outsider", None)).into_kill_event()
}

/// A stored event where an outsider kills `victim` of `guild`.
pub fn death(id: &str, minute: u32, victim: &str, guild: &str) -> KillEvent {
    raw_event(id, minute, 50, ("outsider", None), (victim, Some(guild))).into_kill_event()
}

pub fn scope(id: &str) -> ScopeId {
    ScopeId::new(id)
}
