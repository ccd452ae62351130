//! Tracker subcommands and their dispatch.
//!
//! Every command resolves to one engine call followed by rendering. The
//! caller owns the deadline.

use clap::{Args, Subcommand};
use killboard_core::{Aggregator, LeaderboardTarget, Reconciler};
use killboard_db::KillboardStore;
use killboard_remote::RemoteSource;
use killboard_types::ScopeId;

use crate::config::SyncConfig;
use crate::error::CliError;
use crate::render;

/// Commands that run against a bound scope or the tracked guilds.
#[derive(Debug, Clone, Subcommand)]
pub enum TrackerCommand {
    /// Track a guild in a scope, looked up by its in-game name.
    Bind {
        /// Scope that will own the binding.
        #[arg(long)]
        scope: String,
        /// Guild name as shown in game.
        name: String,
    },
    /// Stop tracking the scope's guild and delete its stored events.
    Unbind {
        /// Scope to unbind.
        #[arg(long)]
        scope: String,
    },
    /// Pull the latest remote events for the scope's guild.
    Sync {
        /// Scope to sync.
        #[arg(long)]
        scope: String,
    },
    /// Drop stored kills of players who left the scope's guild.
    SyncMembers {
        /// Scope to sync.
        #[arg(long)]
        scope: String,
    },
    /// Show the top killers.
    Leaderboard {
        #[command(flatten)]
        target: TargetArgs,
        /// Number of rows (defaults to `sync.leaderboard_limit`).
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show the total kill fame.
    Fame {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Show live statistics for the scope's guild.
    GuildInfo {
        /// Scope whose guild to show.
        #[arg(long)]
        scope: String,
    },
}

/// Either `--scope <id>` or `--global`.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Scope whose guild to report on.
    #[arg(long, required_unless_present = "global", conflicts_with = "global")]
    pub scope: Option<String>,

    /// Report across every tracked guild.
    #[arg(long)]
    pub global: bool,
}

impl TargetArgs {
    /// The aggregation target these flags select.
    pub fn target(&self) -> LeaderboardTarget {
        match &self.scope {
            Some(scope) if !self.global => LeaderboardTarget::Scope(ScopeId::new(scope.as_str())),
            _ => LeaderboardTarget::Global,
        }
    }
}

/// Engine pair plus output defaults.
pub struct Tracker<S, R> {
    reconciler: Reconciler<S, R>,
    aggregator: Aggregator<S, R>,
    leaderboard_limit: u32,
}

impl<S, R> Tracker<S, R>
where
    S: RemoteSource + Clone,
    R: KillboardStore + Clone,
{
    /// Build both engines over shared handles.
    pub fn new(remote: S, store: R, sync: &SyncConfig) -> Self {
        Self {
            reconciler: Reconciler::new(remote.clone(), store.clone())
                .with_settings(sync.settings()),
            aggregator: Aggregator::new(remote, store),
            leaderboard_limit: sync.leaderboard_limit,
        }
    }

    /// Run `command` and render its result.
    pub async fn execute(&self, command: &TrackerCommand) -> Result<String, CliError> {
        let output = match command {
            TrackerCommand::Bind { scope, name } => {
                let binding = self.reconciler.bind(&ScopeId::new(scope.as_str()), name).await?;
                render::bound(&binding)
            }
            TrackerCommand::Unbind { scope } => {
                let report = self.reconciler.unbind(&ScopeId::new(scope.as_str())).await?;
                render::unbound(&report)
            }
            TrackerCommand::Sync { scope } => {
                let report = self
                    .reconciler
                    .sync_events(&ScopeId::new(scope.as_str()))
                    .await?;
                render::synced(&report)
            }
            TrackerCommand::SyncMembers { scope } => {
                let report = self
                    .reconciler
                    .sync_members(&ScopeId::new(scope.as_str()))
                    .await?;
                render::pruned(&report)
            }
            TrackerCommand::Leaderboard { target, limit } => {
                let limit = limit.unwrap_or(self.leaderboard_limit);
                let board = self.aggregator.leaderboard(&target.target(), limit).await?;
                render::leaderboard(&board)
            }
            TrackerCommand::Fame { target } => {
                // A zero-row board still carries the binding and the fame total.
                let board = self.aggregator.leaderboard(&target.target(), 0).await?;
                render::fame(board.total_fame, board.binding.as_ref())
            }
            TrackerCommand::GuildInfo { scope } => {
                let profile = self
                    .aggregator
                    .guild_profile(&ScopeId::new(scope.as_str()))
                    .await?;
                render::profile(&profile)
            }
        };
        Ok(output)
    }
}
