//! Shared type definitions for the Killboard guild tracker.
//!
//! This crate is the single source of truth for the types that flow between
//! the remote client, the event store, and the reconciliation engine.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for scope, guild, player and event ids
//! - [`structs`] -- Bindings, stored kill events, aggregates, guild profiles
//! - [`remote`] -- Payloads as delivered by the remote game API

pub mod ids;
pub mod remote;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::{EventId, GuildId, PlayerId, ScopeId};
pub use remote::{GuildSummary, RawEvent, RawMember, RawParticipant};
pub use structs::{
    Binding, GuildFilter, GuildProfile, KillEvent, KillerTally, NewBinding, PROFILE_TOP_PLAYERS,
    Participant, PvpTotals, TopPlayer,
};
