//! Reconciliation and aggregation for the Killboard guild tracker.
//!
//! Sits between the remote game API and the local event store:
//!
//! ```text
//!                +-------------+
//!  scope ------> | Reconciler  | --> KillboardStore (insert / prune)
//!                |             | <-- RemoteSource   (events, roster)
//!                +-------------+
//!                +-------------+
//!  scope ------> | Aggregator  | --> KillboardStore (tallies, fame)
//!                |             | <-- RemoteSource   (live profile)
//!                +-------------+
//! ```
//!
//! # Modules
//!
//! - [`reconcile`] -- Bind/unbind, event sync, member pruning
//! - [`aggregate`] -- Leaderboards, fame totals, guild profile
//! - [`outcome`] -- Per-item batch accounting
//! - [`error`] -- [`TrackerError`] and user-facing categories

pub mod aggregate;
pub mod error;
pub mod outcome;
pub mod reconcile;

pub use aggregate::{Aggregator, DEFAULT_LEADERBOARD_LIMIT, Leaderboard, LeaderboardTarget};
pub use error::{ErrorCategory, TrackerError};
pub use outcome::{BatchOutcome, Skipped};
pub use reconcile::{
    DEFAULT_KNOWN_WINDOW, PruneReport, Reconciler, SyncReport, SyncSettings, UnbindReport,
};
