//! Shared setup: a registry on an ephemeral port and a mock card host.

use agent_registry::config::RegistryConfig;
use agent_registry::directory::DirectoryServer;
use agent_registry::heartbeat::{HeartbeatClient, HeartbeatConfig};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct RunningRegistry {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RunningRegistry {
    pub async fn start(ttl_secs: u64, sweep_interval_secs: u64) -> Self {
        let config = RegistryConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ttl_secs,
            sweep_interval_secs,
            resolve_timeout_secs: 2,
            ..RegistryConfig::default()
        };
        let server = DirectoryServer::bind(&config).await.unwrap();
        let addr = server.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown: Some(tx),
            task,
        }
    }

    pub fn client(&self, agent_url: &str) -> HeartbeatClient {
        HeartbeatClient::new(HeartbeatConfig::new(self.base_url.clone(), agent_url)).unwrap()
    }

    pub fn named_client(&self, agent_url: &str, name: &str) -> HeartbeatClient {
        HeartbeatClient::new(
            HeartbeatConfig::new(self.base_url.clone(), agent_url).with_name(name),
        )
        .unwrap()
    }

    pub fn heartbeat_client(&self, agent_url: &str, interval: Duration) -> HeartbeatClient {
        HeartbeatClient::new(
            HeartbeatConfig::new(self.base_url.clone(), agent_url).with_interval(interval),
        )
        .unwrap()
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = reqwest::get(format!("{}{}", self.base_url, path))
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

/// A mock agent serving its card at the well-known path.
pub async fn card_host(name: &str, skills: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    let skills: Vec<Value> = skills.iter().map(|s| json!({ "id": s, "name": s })).collect();
    Mock::given(method("GET"))
        .and(path("/.well-known/agent-card.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "description": format!("{} agent", name),
            "url": server.uri(),
            "version": "1.0.0",
            "provider": { "organization": "Lab", "url": "https://lab.example" },
            "skills": skills,
        })))
        .mount(&server)
        .await;
    server
}
