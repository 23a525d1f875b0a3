//! Heartbeat Client Helper
//!
//! Runs inside an agent process. Registers once, then keeps the entry alive by
//! calling the registry on a period shorter than its TTL. Failures are logged
//! and retried on the next tick; they never take the agent down.

use crate::directory::{AgentListResponse, HeartbeatRequest, RegistrationRequest};
use crate::error::{ErrorResponse, RegistryError, RegistryResult};
use crate::registry::reaper::first_tick_after;
use crate::registry::AgentRecord;
use reqwest::{Client, Response, Url};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const REGISTRY_URL_ENV: &str = "A2A_REGISTRY_URL";
pub const AGENT_URL_ENV: &str = "A2A_AGENT_URL";

/// A third of the default 300s TTL
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(100);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    pub registry_url: String,
    pub agent_url: String,
    /// Sent with the initial registration; skips card resolution when set
    pub name: Option<String>,
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl HeartbeatConfig {
    pub fn new(registry_url: impl Into<String>, agent_url: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
            agent_url: agent_url.into(),
            name: None,
            interval: DEFAULT_HEARTBEAT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// `None` unless both `A2A_REGISTRY_URL` and `A2A_AGENT_URL` are set.
    pub fn from_env() -> Option<Self> {
        let registry_url = non_empty_env(REGISTRY_URL_ENV)?;
        let agent_url = non_empty_env(AGENT_URL_ENV)?;
        Some(Self::new(registry_url, agent_url))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// HTTP client for the directory API.
#[derive(Clone)]
pub struct HeartbeatClient {
    http: Client,
    config: HeartbeatConfig,
}

impl HeartbeatClient {
    pub fn new(config: HeartbeatConfig) -> RegistryResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RegistryError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HeartbeatConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> RegistryResult<Url> {
        let base = self.config.registry_url.trim().trim_end_matches('/');
        let mut url = Url::parse(base).map_err(|e| {
            RegistryError::InvalidInput(format!("Invalid registry URL {}: {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RegistryError::InvalidInput(format!("Registry URL cannot be a base: {}", base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// One-shot `POST /register`.
    pub async fn register(&self) -> RegistryResult<AgentRecord> {
        let mut body = RegistrationRequest::for_agent(self.config.agent_url.clone());
        if let Some(name) = &self.config.name {
            body = body.with_name(name.clone());
        }
        let response = self
            .http
            .post(self.endpoint(&["register"])?)
            .json(&body)
            .send()
            .await
            .map_err(unreachable)?;
        decode(response).await
    }

    /// `POST /heartbeat`; the registry re-registers under the configured name,
    /// or through the card, if it no longer knows us.
    pub async fn heartbeat(&self) -> RegistryResult<AgentRecord> {
        let body = HeartbeatRequest {
            agent_url: self.config.agent_url.clone(),
            name: self.config.name.clone(),
        };
        let response = self
            .http
            .post(self.endpoint(&["heartbeat"])?)
            .json(&body)
            .send()
            .await
            .map_err(unreachable)?;
        decode(response).await
    }

    /// `DELETE /agents/{agent_url}`
    pub async fn unregister(&self) -> RegistryResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&["agents", &self.config.agent_url])?)
            .send()
            .await
            .map_err(unreachable)?;
        check_status(response).await.map(|_| ())
    }

    /// `GET /agents`
    pub async fn list(&self) -> RegistryResult<Vec<AgentRecord>> {
        let response = self
            .http
            .get(self.endpoint(&["agents"])?)
            .send()
            .await
            .map_err(unreachable)?;
        let listing: AgentListResponse = decode(response).await?;
        Ok(listing.agents)
    }

    /// Register, then heartbeat every `interval` on a background task.
    pub fn spawn(self) -> HeartbeatHandle {
        let shutdown = Arc::new(Notify::new());
        let signal = Arc::clone(&shutdown);
        let handle = tokio::spawn(async move { self.run(signal).await });
        HeartbeatHandle {
            shutdown,
            handle: Some(handle),
        }
    }

    async fn run(self, shutdown: Arc<Notify>) {
        let period = self.config.interval;
        let agent_url = self.config.agent_url.as_str();
        info!(
            agent_url,
            registry = %self.config.registry_url,
            interval_secs = period.as_secs(),
            "Heartbeat started"
        );

        let mut registered = self.try_register().await;

        let mut ticker = interval_at(first_tick_after(period), period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !registered {
                        registered = self.try_register().await;
                        continue;
                    }
                    match self.heartbeat().await {
                        Ok(record) => debug!(agent_url, expires_at = %record.expires_at, "Heartbeat sent"),
                        Err(e) => {
                            warn!(agent_url, error = %e, "Heartbeat failed, will re-register");
                            registered = false;
                        }
                    }
                }
                _ = shutdown.notified() => break,
            }
        }

        info!(agent_url, "Heartbeat stopped");
    }

    async fn try_register(&self) -> bool {
        match self.register().await {
            Ok(record) => {
                info!(name = %record.name, url = %record.url, "Registered with agent registry");
                true
            }
            Err(e) => {
                warn!(agent_url = %self.config.agent_url, error = %e, "Registration failed, retrying next period");
                false
            }
        }
    }
}

/// Start heartbeating when `A2A_REGISTRY_URL` and `A2A_AGENT_URL` are set.
pub fn spawn_from_env() -> Option<HeartbeatHandle> {
    let config = HeartbeatConfig::from_env()?;
    match HeartbeatClient::new(config) {
        Ok(client) => Some(client.spawn()),
        Err(e) => {
            warn!(error = %e, "Auto-registration disabled");
            None
        }
    }
}

/// Owner of a running heartbeat task.
pub struct HeartbeatHandle {
    shutdown: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl HeartbeatHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Stop heartbeating and wait for the task to exit. Does not unregister.
    pub async fn stop(mut self) {
        self.shutdown.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

fn unreachable(e: reqwest::Error) -> RegistryError {
    RegistryError::RegistryUnavailable(e.to_string())
}

async fn check_status(response: Response) -> RegistryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = match response.json::<ErrorResponse>().await {
        Ok(body) => format!("{} ({})", body.error, body.code),
        Err(_) => "no error body".to_string(),
    };
    Err(RegistryError::RegistryUnavailable(format!(
        "registry returned {}: {}",
        status, detail
    )))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> RegistryResult<T> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| RegistryError::RegistryUnavailable(format!("Malformed registry response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record_json(url: &str) -> serde_json::Value {
        json!({
            "name": "Calculator",
            "description": "",
            "url": url,
            "skills": ["add"],
            "registered_at": "2026-01-01T00:00:00Z",
            "last_seen": "2026-01-01T00:00:00Z",
            "expires_at": "2026-01-01T00:05:00Z"
        })
    }

    #[test]
    fn test_default_interval_is_a_third_of_ttl() {
        let config = HeartbeatConfig::new("http://registry:8000", "http://agent:9999");
        assert_eq!(config.interval, Duration::from_secs(100));
        assert!(config.interval < crate::registry::DEFAULT_TTL);
    }

    #[tokio::test]
    async fn test_from_env_requires_both_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(json!({"agent_url": "http://env-agent:9999"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("http://env-agent:9999")))
            .expect(1)
            .mount(&server)
            .await;

        std::env::set_var(REGISTRY_URL_ENV, server.uri());
        std::env::remove_var(AGENT_URL_ENV);
        let registry_only = HeartbeatConfig::from_env();
        let no_handle = spawn_from_env();

        std::env::set_var(AGENT_URL_ENV, "http://env-agent:9999");
        let both = HeartbeatConfig::from_env();
        let handle = spawn_from_env();

        std::env::remove_var(REGISTRY_URL_ENV);
        std::env::remove_var(AGENT_URL_ENV);

        assert!(registry_only.is_none());
        assert!(no_handle.is_none());

        let config = both.unwrap();
        assert_eq!(config.registry_url, server.uri());
        assert_eq!(config.agent_url, "http://env-agent:9999");
        assert_eq!(config.interval, DEFAULT_HEARTBEAT_INTERVAL);

        let handle = handle.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop().await;
        server.verify().await;
    }

    #[test]
    fn test_endpoint_encodes_agent_url() {
        let client = HeartbeatClient::new(HeartbeatConfig::new(
            "http://registry:8000/",
            "http://agent:9999",
        ))
        .unwrap();
        let url = client.endpoint(&["agents", "http://agent:9999"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://registry:8000/agents/http:%2F%2Fagent:9999"
        );
    }

    #[tokio::test]
    async fn test_register_posts_agent_url_and_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(json!({"agent_url": "http://agent:9999", "name": "Calc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("http://agent:9999")))
            .expect(1)
            .mount(&server)
            .await;

        let client = HeartbeatClient::new(
            HeartbeatConfig::new(server.uri(), "http://agent:9999").with_name("Calc"),
        )
        .unwrap();
        let record = client.register().await.unwrap();
        assert_eq!(record.url, "http://agent:9999");
    }

    #[tokio::test]
    async fn test_heartbeat_carries_configured_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/heartbeat"))
            .and(body_json(json!({"agent_url": "http://agent:9999", "name": "Calc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("http://agent:9999")))
            .expect(1)
            .mount(&server)
            .await;

        let client = HeartbeatClient::new(
            HeartbeatConfig::new(server.uri(), "http://agent:9999").with_name("Calc"),
        )
        .unwrap();
        client.heartbeat().await.unwrap();
    }

    #[tokio::test]
    async fn test_register_surfaces_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({
                "error": "Failed to resolve agent card",
                "code": "RESOLUTION_FAILED"
            })))
            .mount(&server)
            .await;

        let client =
            HeartbeatClient::new(HeartbeatConfig::new(server.uri(), "http://agent:9999")).unwrap();
        match client.register().await {
            Err(RegistryError::RegistryUnavailable(msg)) => {
                assert!(msg.contains("RESOLUTION_FAILED"), "{}", msg)
            }
            other => panic!("expected RegistryUnavailable, got {:?}", other.map(|r| r.url)),
        }
    }

    #[tokio::test]
    async fn test_unreachable_registry() {
        let client = HeartbeatClient::new(
            HeartbeatConfig::new("http://127.0.0.1:9", "http://agent:9999")
                .with_request_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        assert!(matches!(
            client.heartbeat().await,
            Err(RegistryError::RegistryUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_spawn_registers_then_heartbeats() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("http://agent:9999")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/heartbeat"))
            .and(body_json(json!({"agent_url": "http://agent:9999"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("http://agent:9999")))
            .expect(2..)
            .mount(&server)
            .await;

        let client = HeartbeatClient::new(
            HeartbeatConfig::new(server.uri(), "http://agent:9999")
                .with_interval(Duration::from_millis(50)),
        )
        .unwrap();
        let handle = client.spawn();
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.stop().await;

        server.verify().await;
    }

    #[tokio::test]
    async fn test_spawn_retries_registration_after_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("http://agent:9999")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/heartbeat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("http://agent:9999")))
            .mount(&server)
            .await;

        let handle = HeartbeatClient::new(
            HeartbeatConfig::new(server.uri(), "http://agent:9999")
                .with_interval(Duration::from_millis(50)),
        )
        .unwrap()
        .spawn();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!handle.is_finished());
        handle.stop().await;

        let requests = server.received_requests().await.unwrap();
        let registers = requests.iter().filter(|r| r.url.path() == "/register").count();
        let heartbeats = requests.iter().filter(|r| r.url.path() == "/heartbeat").count();
        assert_eq!(registers, 2);
        assert!(heartbeats >= 1);
    }
}
