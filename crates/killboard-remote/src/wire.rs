//! Response envelopes that only the HTTP client needs to see.
//!
//! Search results arrive wrapped in `{guilds: [...]}` and the guild profile
//! arrives as four nested objects. Both are unwrapped here into the shared
//! types.

use killboard_types::{
    GuildId, GuildProfile, GuildSummary, PROFILE_TOP_PLAYERS, PlayerId, PvpTotals, TopPlayer,
};
use serde::Deserialize;

/// `GET /search` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub guilds: Vec<GuildSummary>,
}

/// `GET /guilds/{id}/data` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    guild: ProfileGuild,
    #[serde(default)]
    basic: ProfileBasic,
    #[serde(default)]
    overall: ProfileOverall,
    #[serde(rename = "topPlayers", default)]
    top_players: Vec<ProfilePlayer>,
}

#[derive(Debug, Deserialize)]
struct ProfileGuild {
    #[serde(rename = "Id")]
    id: GuildId,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "FounderName", default)]
    founder_name: Option<String>,
    #[serde(rename = "killFame", default)]
    kill_fame: i64,
    #[serde(rename = "DeathFame", default)]
    death_fame: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileBasic {
    #[serde(rename = "memberCount", default)]
    member_count: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileOverall {
    #[serde(default)]
    kills: i64,
    #[serde(default)]
    deaths: i64,
    #[serde(default)]
    fame: i64,
}

#[derive(Debug, Deserialize)]
struct ProfilePlayer {
    #[serde(rename = "Id")]
    id: PlayerId,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "KillFame", default)]
    kill_fame: i64,
    #[serde(rename = "DeathFame", default)]
    death_fame: i64,
    #[serde(rename = "FameRatio", default)]
    fame_ratio: Option<f64>,
    #[serde(rename = "totalKills", default)]
    total_kills: Option<i64>,
}

impl ProfileResponse {
    /// Flatten into a [`GuildProfile`], keeping at most five top players.
    pub(crate) fn into_profile(self) -> GuildProfile {
        GuildProfile {
            id: self.guild.id,
            name: self.guild.name,
            founder: self.guild.founder_name.unwrap_or_default(),
            member_count: self.basic.member_count,
            kill_fame: self.guild.kill_fame,
            death_fame: self.guild.death_fame,
            pvp: PvpTotals {
                kills: self.overall.kills,
                deaths: self.overall.deaths,
                fame: self.overall.fame,
            },
            top_players: self
                .top_players
                .into_iter()
                .take(PROFILE_TOP_PLAYERS)
                .map(|p| TopPlayer {
                    id: p.id,
                    name: p.name,
                    kill_fame: p.kill_fame,
                    death_fame: p.death_fame,
                    fame_ratio: p.fame_ratio.unwrap_or_default(),
                    total_kills: p.total_kills.unwrap_or_default(),
                })
                .collect(),
        }
    }
}
