//! Remote data client for the Killboard guild tracker.
//!
//! Fetches guild search results, the recent event window, the member
//! roster, and the guild profile from the game's public HTTP API. Nothing
//! here writes to the remote service.
//!
//! # Architecture
//!
//! ```text
//! Reconciler --> RemoteSource (trait)
//!                   |-- AlbionClient          (reqwest, JSON)
//!                   +-- RetryingSource<S>     (backoff decorator)
//! ```
//!
//! # Modules
//!
//! - [`source`] -- The [`RemoteSource`] trait and [`EventPage`]
//! - [`client`] -- HTTP implementation
//! - [`retry`] -- Retry/backoff decorator
//! - [`error`] -- [`RemoteError`]

pub mod client;
pub mod error;
pub mod retry;
pub mod source;
mod wire;

pub use client::{AlbionClient, ClientConfig};
pub use error::RemoteError;
pub use retry::{RetryPolicy, RetryingSource};
pub use source::{DEFAULT_EVENT_LIMIT, EventPage, RemoteSource};
