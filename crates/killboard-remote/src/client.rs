//! HTTP implementation of [`RemoteSource`] for the game's public API.
//!
//! All endpoints are plain `GET` requests against a configured base URL
//! and return JSON. Transport, status and decoding failures are mapped to
//! [`RemoteError`] here so nothing above this module sees `reqwest` types.

use std::time::Duration;

use killboard_types::{GuildId, GuildProfile, GuildSummary, RawEvent, RawMember};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::RemoteError;
use crate::source::{EventPage, RemoteSource};
use crate::wire::{ProfileResponse, SearchResponse};

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default `User-Agent` header.
const DEFAULT_USER_AGENT: &str = concat!("killboard/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`AlbionClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL without a trailing slash
    /// (e.g. `https://gameinfo.albiononline.com/api/gameinfo`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration for `base_url` with default timeout and user agent.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        user_agent.clone_into(&mut self.user_agent);
        self
    }
}

/// Client for the game's public guild/event API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct AlbionClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AlbionClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidInput`] if the base URL is empty or not
    /// an absolute `http(s)` URL, or the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteError> {
        if config.base_url.trim().is_empty() {
            return Err(RemoteError::InvalidInput("remote base URL is empty".to_owned()));
        }
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            RemoteError::InvalidInput(format!("remote base URL {:?}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidInput(format!(
                "remote base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RemoteError::InvalidInput(format!("HTTP client build failed: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append `segments` to the base URL path, percent-encoding each one.
    ///
    /// Ids land in the path as single segments, so `/`, `?` or `#` in an id
    /// cannot change which endpoint is hit.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RemoteError::InvalidInput(format!(
                    "remote base URL {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a `GET` against `segments` under the base URL and decode the
    /// JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_owned();
        tracing::debug!(url = %url, "Fetching remote resource");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("GET {path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            tracing::warn!(path = %path, status = status.as_u16(), "Remote returned error status");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(format!("GET {path} body: {e}")))?;

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Parse(format!("GET {path}: {e}")))
    }
}

impl RemoteSource for AlbionClient {
    async fn lookup_guild_by_name(&self, name: &str) -> Result<GuildSummary, RemoteError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RemoteError::InvalidInput(
                "guild name must be a non-empty string".to_owned(),
            ));
        }

        let response: SearchResponse = self.get_json(&["search"], &[("q", name.to_owned())]).await?;

        response.guilds.into_iter().next().ok_or_else(|| {
            tracing::info!(name, "Guild search returned no results");
            RemoteError::NotFound(format!("guild {name:?}"))
        })
    }

    async fn fetch_recent_events(
        &self,
        guild: &GuildId,
        page: EventPage,
    ) -> Result<Vec<RawEvent>, RemoteError> {
        if guild.is_blank() {
            return Err(RemoteError::InvalidInput(
                "guild id must be a non-empty string".to_owned(),
            ));
        }

        let events: Vec<RawEvent> = self
            .get_json(
                &["events"],
                &[
                    ("guildId", guild.to_string()),
                    ("limit", page.limit.to_string()),
                    ("offset", page.offset.to_string()),
                ],
            )
            .await?;

        tracing::debug!(guild = %guild, count = events.len(), "Fetched event window");
        Ok(events)
    }

    async fn fetch_roster(&self, guild: &GuildId) -> Result<Vec<RawMember>, RemoteError> {
        if guild.is_blank() {
            return Err(RemoteError::InvalidInput(
                "guild id must be a non-empty string".to_owned(),
            ));
        }

        self.get_json(&["guilds", guild.as_str(), "members"], &[]).await
    }

    async fn fetch_guild_profile(&self, guild: &GuildId) -> Result<GuildProfile, RemoteError> {
        if guild.is_blank() {
            return Err(RemoteError::InvalidInput(
                "guild id must be a non-empty string".to_owned(),
            ));
        }

        let response: ProfileResponse = self
            .get_json(&["guilds", guild.as_str(), "data"], &[])
            .await?;
        Ok(response.into_profile())
    }
}
