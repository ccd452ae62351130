//! Retry decorator for any [`RemoteSource`].
//!
//! [`RetryingSource`] re-issues a failed call when the failure is
//! retryable (see [`RemoteError::is_retryable`]), sleeping with exponential
//! backoff and jitter between attempts. From the caller's side it is still
//! one call with one result.

use std::future::Future;
use std::time::Duration;

use killboard_types::{GuildId, GuildProfile, GuildSummary, RawEvent, RawMember};
use rand::Rng;

use crate::error::RemoteError;
use crate::source::{EventPage, RemoteSource};

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each subsequent retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based), without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// [`Self::backoff`] with up to 25% random jitter either way.
    fn jittered(&self, attempt: u32) -> Duration {
        let base = self.backoff(attempt);
        let quarter = base / 4;
        if quarter.is_zero() {
            return base;
        }
        let spread = rand::rng().random_range(Duration::ZERO..=quarter.saturating_mul(2));
        base.saturating_sub(quarter).saturating_add(spread)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Wraps a [`RemoteSource`] and retries retryable failures.
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingSource<S> {
    /// Wrap `inner` with `policy`.
    pub const fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped source.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Run `call` until it succeeds, fails non-retryably, or retries run out.
    async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.jittered(attempt);
                    attempt = attempt.saturating_add(1);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Remote call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<S: RemoteSource> RemoteSource for RetryingSource<S> {
    async fn lookup_guild_by_name(&self, name: &str) -> Result<GuildSummary, RemoteError> {
        self.run("lookup_guild_by_name", || self.inner.lookup_guild_by_name(name))
            .await
    }

    async fn fetch_recent_events(
        &self,
        guild: &GuildId,
        page: EventPage,
    ) -> Result<Vec<RawEvent>, RemoteError> {
        self.run("fetch_recent_events", || {
            self.inner.fetch_recent_events(guild, page)
        })
        .await
    }

    async fn fetch_roster(&self, guild: &GuildId) -> Result<Vec<RawMember>, RemoteError> {
        self.run("fetch_roster", || self.inner.fetch_roster(guild))
            .await
    }

    async fn fetch_guild_profile(&self, guild: &GuildId) -> Result<GuildProfile, RemoteError> {
        self.run("fetch_guild_profile", || self.inner.fetch_guild_profile(guild))
            .await
    }
}
