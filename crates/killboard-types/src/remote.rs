//! Payloads returned by the remote game API.
//!
//! Field names follow the remote JSON exactly (`PascalCase`, with a few
//! camel-case exceptions). Conversions into stored entities live here so
//! both the store and the reconciliation engine see one normalized shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{EventId, GuildId, PlayerId};
use crate::structs::{KillEvent, Participant};

/// A guild search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GuildSummary {
    /// Remote guild identifier.
    pub id: GuildId,
    /// Guild name.
    pub name: String,
    /// Guild death fame.
    #[serde(default)]
    pub death_fame: i64,
}

/// One participant of a [`RawEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawParticipant {
    /// Remote player identifier.
    pub id: PlayerId,
    /// Player name.
    pub name: String,
    /// Guild id; the remote service sends an empty string for guildless players.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Average item power.
    #[serde(default)]
    pub average_item_power: f64,
}

impl RawParticipant {
    fn into_participant(self) -> Participant {
        let guild_id = self
            .guild_id
            .filter(|g| !g.trim().is_empty())
            .map(GuildId::from);
        Participant {
            id: self.id,
            name: self.name,
            guild_id,
            avg_item_power: self.average_item_power,
        }
    }
}

/// A kill/death event as delivered by the remote event window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEvent {
    /// Remote event id. Sent as a JSON number, accepted as a string too.
    #[serde(deserialize_with = "de::string_or_number")]
    pub event_id: EventId,
    /// Event time. RFC 3339; a missing offset is read as UTC.
    #[serde(rename = "TimeStamp", deserialize_with = "de::lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Fame awarded for the kill.
    #[serde(default)]
    pub total_victim_kill_fame: i64,
    /// Area type of the kill.
    #[serde(default)]
    pub kill_area: Option<String>,
    /// Killer snapshot.
    pub killer: RawParticipant,
    /// Victim snapshot.
    pub victim: RawParticipant,
}

impl RawEvent {
    /// Normalize into the stored [`KillEvent`] shape.
    pub fn into_kill_event(self) -> KillEvent {
        KillEvent {
            event_id: self.event_id,
            timestamp: self.timestamp,
            kill_fame: self.total_victim_kill_fame,
            kill_area: self.kill_area.unwrap_or_default(),
            killer: self.killer.into_participant(),
            victim: self.victim.into_participant(),
        }
    }
}

/// A roster entry. Only the identity fields are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawMember {
    /// Remote player identifier.
    pub id: PlayerId,
    /// Player name.
    pub name: String,
}

/// Deserialization helpers for the remote API's loose typing.
pub mod de {
    use super::{DateTime, Deserialize, Deserializer, NaiveDateTime, Utc};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    /// Accept an identifier sent either as a JSON string or a JSON integer.
    pub fn string_or_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: From<String>,
    {
        let raw = match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Uint(n) => n.to_string(),
        };
        Ok(T::from(raw))
    }

    /// Parse an RFC 3339 timestamp, falling back to a naive one taken as UTC.
    pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    /// Parse a remote timestamp string.
    pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }
}
