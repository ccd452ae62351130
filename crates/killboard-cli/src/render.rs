//! Plain-text rendering of command results.

use std::fmt::Write as _;

use killboard_core::{Leaderboard, PruneReport, SyncReport, UnbindReport};
use killboard_types::{Binding, GuildProfile};

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Ranked killer list with the fame footer.
pub fn leaderboard(board: &Leaderboard) -> String {
    if board.entries.is_empty() {
        return "No data available for the leaderboard.".to_owned();
    }

    let mut out = String::new();
    match &board.binding {
        Some(binding) => {
            let _ = writeln!(out, "🏆 {} Leaderboard 🏆", binding.name);
        }
        None => out.push_str("🏆 Global Leaderboard 🏆\n"),
    }
    out.push('\n');

    for (idx, tally) in board.entries.iter().enumerate() {
        let rank = MEDALS
            .get(idx)
            .map_or_else(|| format!("{}.", idx.saturating_add(1)), |m| (*m).to_owned());
        let _ = writeln!(out, "{rank} {} - {} kills", tally.name, tally.kills);
    }

    out.push('\n');
    let _ = write!(out, "{}", fame(board.total_fame, board.binding.as_ref()));
    out
}

/// Fame total, with the tracking date for a scoped total.
pub fn fame(total: i64, binding: Option<&Binding>) -> String {
    match binding {
        Some(binding) => format!(
            "Total Guild Fame: {total}\nTracking since: {}",
            binding.created_at.format("%Y-%m-%d")
        ),
        None => format!("Total Fame (all tracked guilds): {total}"),
    }
}

/// Guild profile card.
pub fn profile(profile: &GuildProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🛡️ {}", profile.name);
    let _ = writeln!(out, "👑 Founder: {}", profile.founder);
    let _ = writeln!(out, "👥 Members: {}", profile.member_count);
    let _ = writeln!(
        out,
        "✨ Fame: kill {} / death {} / overall {}",
        profile.kill_fame, profile.death_fame, profile.pvp.fame
    );
    let ratio = profile
        .kill_death_ratio()
        .map_or_else(|| "n/a".to_owned(), |r| format!("{r:.2}"));
    let _ = writeln!(
        out,
        "⚔️ PvP: {} kills / {} deaths / K/D {ratio}",
        profile.pvp.kills, profile.pvp.deaths
    );

    if !profile.top_players.is_empty() {
        out.push_str("\n🏆 Top Players\n");
        for (idx, player) in profile.top_players.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} - {} kills (kill fame {}, death fame {}, ratio {:.2})",
                idx.saturating_add(1),
                player.name,
                player.total_kills,
                player.kill_fame,
                player.death_fame,
                player.fame_ratio
            );
        }
    }
    out
}

/// Confirmation for a new binding.
pub fn bound(binding: &Binding) -> String {
    format!(
        "Guild {} ({}) is now tracked for scope {}.",
        binding.name, binding.external_id, binding.scope_id
    )
}

/// Confirmation for a removed binding.
pub fn unbound(report: &UnbindReport) -> String {
    format!(
        "Guild {} is no longer tracked for scope {} ({} events deleted).",
        report.binding.name, report.binding.scope_id, report.events_deleted
    )
}

/// Summary of an event sync.
pub fn synced(report: &SyncReport) -> String {
    let mut out = format!(
        "Synced {} new events ({} fetched).",
        report.inserted(),
        report.fetched
    );
    append_skipped(&mut out, report.outcome.skipped_items().len());
    out
}

/// Summary of a member sync.
pub fn pruned(report: &PruneReport) -> String {
    let mut out = format!(
        "Removed {} departed members ({} events deleted, {} on roster).",
        report.removed(),
        report.rows_deleted,
        report.roster_size
    );
    append_skipped(&mut out, report.outcome.skipped_items().len());
    out
}

fn append_skipped(out: &mut String, skipped: usize) {
    if skipped > 0 {
        let _ = write!(out, " {skipped} could not be applied; see the log.");
    }
}
