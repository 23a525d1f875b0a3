//! Agent Card Resolver
//!
//! Fetches an agent's card either from the well-known path beneath its base URL
//! or from a direct card URL. Network failures, non-success statuses, timeouts
//! and unparseable documents all surface as `ResolutionFailed`.

use super::{well_known_card_url, ResolvedCard};
use crate::error::{RegistryError, RegistryResult, ResolveError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a single card fetch
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait CardResolver: Send + Sync {
    /// Fetch and parse the card at `card_url` as-is
    async fn fetch(&self, card_url: &str) -> Result<ResolvedCard, ResolveError>;

    /// Resolve a card given a direct card URL
    async fn resolve_card(&self, card_url: &str) -> RegistryResult<ResolvedCard> {
        self.fetch(card_url).await.map_err(|source| {
            warn!(card_url = %card_url, error = %source, "Agent card resolution failed");
            RegistryError::resolution(card_url, source)
        })
    }

    /// Resolve a card from the well-known path beneath an agent base URL
    async fn resolve_agent(&self, agent_url: &str) -> RegistryResult<ResolvedCard> {
        let card_url = well_known_card_url(agent_url);
        self.resolve_card(&card_url).await
    }
}

/// Resolver backed by `reqwest`
pub struct HttpCardResolver {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpCardResolver {
    pub fn new(timeout: Duration) -> RegistryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RegistryError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_inner(&self, card_url: &str) -> Result<serde_json::Value, ResolveError> {
        let response = self.client.get(card_url).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout(self.timeout)
            } else {
                ResolveError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout(self.timeout)
            } else {
                ResolveError::Request(e)
            }
        })?;
        serde_json::from_slice(&body).map_err(|e| ResolveError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl CardResolver for HttpCardResolver {
    async fn fetch(&self, card_url: &str) -> Result<ResolvedCard, ResolveError> {
        debug!(card_url = %card_url, "Fetching agent card");
        let raw = tokio::time::timeout(self.timeout, self.fetch_inner(card_url))
            .await
            .map_err(|_| ResolveError::Timeout(self.timeout))??;
        ResolvedCard::parse(card_url, raw)
    }
}
