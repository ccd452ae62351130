//! Event store for the Killboard guild tracker.
//!
//! Persists two entities: guild bindings and kill/death events. The
//! reconciliation engine and the aggregation layer only talk to the store
//! through the [`KillboardStore`] trait, so they can run against
//! `PostgreSQL` in production and against [`MemoryStore`] in tests.
//!
//! # Architecture
//!
//! ```text
//! Reconciler / Aggregator
//!     |
//!     +-- KillboardStore (trait)
//!         |-- PgStore      (PostgreSQL pool)
//!         |     |-- GuildStore  (guilds table)
//!         |     +-- EventStore  (events table, aggregates)
//!         +-- MemoryStore  (in-process tables)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`KillboardStore`] trait
//! - [`postgres`] -- `PostgreSQL` connection pool and [`PgStore`]
//! - [`guild_store`] -- Binding queries
//! - [`event_store`] -- Event queries and aggregates
//! - [`memory`] -- In-memory implementation
//! - [`error`] -- Shared error types

pub mod error;
pub mod event_store;
pub mod guild_store;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use event_store::EventStore;
pub use guild_store::GuildStore;
pub use memory::MemoryStore;
pub use postgres::{PgStore, PostgresConfig};
pub use store::KillboardStore;
