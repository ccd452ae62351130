//! Core entity structs: guild bindings, stored kill events, and the
//! read-only projections served by the aggregation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EventId, GuildId, PlayerId, ScopeId};

// ---------------------------------------------------------------------------
// Guild binding
// ---------------------------------------------------------------------------

/// Association between a local scope and one remote guild.
///
/// A scope owns zero or one binding. The `(external_id, scope_id)` pair is
/// unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Remote guild identifier.
    pub external_id: GuildId,
    /// Owning scope.
    pub scope_id: ScopeId,
    /// Guild name as reported by the remote service at bind time.
    pub name: String,
    /// Guild death fame snapshot taken at bind time.
    pub death_fame: i64,
    /// When the binding row was inserted. Immutable.
    pub created_at: DateTime<Utc>,
}

/// A binding that has not been persisted yet.
///
/// `created_at` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBinding {
    /// Remote guild identifier.
    pub external_id: GuildId,
    /// Owning scope.
    pub scope_id: ScopeId,
    /// Guild name.
    pub name: String,
    /// Guild death fame at bind time.
    pub death_fame: i64,
}

// ---------------------------------------------------------------------------
// Kill events
// ---------------------------------------------------------------------------

/// Denormalized snapshot of one side of a kill, as of the kill itself.
///
/// Players are not modeled separately; there is no referential integrity
/// between events and any player record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Remote player identifier.
    pub id: PlayerId,
    /// Player name at the time of the kill.
    pub name: String,
    /// Player guild at the time of the kill. `None` when guildless.
    pub guild_id: Option<GuildId>,
    /// Average item power of the equipped gear.
    pub avg_item_power: f64,
}

/// A stored kill/death event. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    /// Globally unique remote event id (dedup key).
    pub event_id: EventId,
    /// When the kill happened.
    pub timestamp: DateTime<Utc>,
    /// Fame awarded for the kill.
    pub kill_fame: i64,
    /// Area type where the kill happened.
    pub kill_area: String,
    /// The player who scored the kill.
    pub killer: Participant,
    /// The player who died.
    pub victim: Participant,
}

impl KillEvent {
    /// Whether either participant belonged to `guild` at kill time.
    pub fn involves_guild(&self, guild: &GuildId) -> bool {
        self.killer.guild_id.as_ref() == Some(guild) || self.victim.guild_id.as_ref() == Some(guild)
    }

    /// Whether the killer belonged to `guild` at kill time.
    pub fn scored_by_guild(&self, guild: &GuildId) -> bool {
        self.killer.guild_id.as_ref() == Some(guild)
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// One leaderboard line: a killer name and its kill count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillerTally {
    /// Killer name as recorded on the events.
    pub name: String,
    /// Number of stored kills.
    pub kills: i64,
}

/// Which events an aggregate query runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildFilter {
    /// Events scored by members of one guild.
    Guild(GuildId),
    /// Events scored by members of any bound guild.
    AllBound,
}

// ---------------------------------------------------------------------------
// Guild profile (live remote projection)
// ---------------------------------------------------------------------------

/// Maximum number of top players kept on a [`GuildProfile`].
pub const PROFILE_TOP_PLAYERS: usize = 5;

/// Live guild statistics fetched from the remote service. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildProfile {
    /// Remote guild identifier.
    pub id: GuildId,
    /// Guild name.
    pub name: String,
    /// Founder player name.
    pub founder: String,
    /// Current member count.
    pub member_count: i64,
    /// Guild kill fame.
    pub kill_fame: i64,
    /// Guild death fame.
    pub death_fame: i64,
    /// Overall PvP counters.
    pub pvp: PvpTotals,
    /// Best players, at most [`PROFILE_TOP_PLAYERS`].
    pub top_players: Vec<TopPlayer>,
}

impl GuildProfile {
    /// Kills divided by deaths. `None` when the guild has no deaths.
    #[allow(clippy::cast_precision_loss)]
    pub fn kill_death_ratio(&self) -> Option<f64> {
        if self.pvp.deaths == 0 {
            return None;
        }
        Some(self.pvp.kills as f64 / self.pvp.deaths as f64)
    }
}

/// Overall PvP counters of a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PvpTotals {
    /// Total kills.
    pub kills: i64,
    /// Total deaths.
    pub deaths: i64,
    /// Total fame.
    pub fame: i64,
}

/// A top player entry on a [`GuildProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlayer {
    /// Remote player identifier.
    pub id: PlayerId,
    /// Player name.
    pub name: String,
    /// Kill fame.
    pub kill_fame: i64,
    /// Death fame.
    pub death_fame: i64,
    /// Fame ratio reported by the remote service.
    pub fame_ratio: f64,
    /// Total kills.
    pub total_kills: i64,
}
