use super::harness::{card_host, RunningRegistry};
use agent_registry::error::RegistryError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_register_resolves_card_and_lists_agent() {
    let registry = RunningRegistry::start(300, 60).await;
    let agent = card_host("Calculator", &["add", "subtract"]).await;

    let client = registry.client(&agent.uri());
    let record = client.register().await.unwrap();
    assert_eq!(record.name, "Calculator");
    assert_eq!(record.skills, vec!["add", "subtract"]);
    assert_eq!(record.version.as_deref(), Some("1.0.0"));

    let agents = client.list().await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].url, agent.uri());

    let (status, card) = registry
        .get_json(&format!("/agents/{}/card", agent.uri()))
        .await;
    assert_eq!(status, 200);
    assert_eq!(card["name"], "Calculator");

    registry.shutdown().await;
}

#[tokio::test]
async fn test_discovery_index_and_unregister() {
    let registry = RunningRegistry::start(300, 60).await;
    let agent = card_host("Lights", &["toggle"]).await;
    let client = registry.client(&agent.uri());
    client.register().await.unwrap();

    let (status, index) = registry.get_json("/.well-known/agents/index.json").await;
    assert_eq!(status, 200);
    assert_eq!(index["agents"][0]["name"], "Lights");
    assert_eq!(
        index["agents"][0]["card_url"],
        format!("{}/.well-known/agent-card.json", agent.uri())
    );

    client.unregister().await.unwrap();
    assert!(client.list().await.unwrap().is_empty());

    // Idempotent: a second delete still succeeds
    client.unregister().await.unwrap();

    registry.shutdown().await;
}

#[tokio::test]
async fn test_failing_card_host_leaves_registry_unchanged() {
    let registry = RunningRegistry::start(300, 60).await;
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/agent-card.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let (status, body) = registry
        .post_json(
            "/register",
            json!({ "card_url": format!("{}/.well-known/agent-card.json", broken.uri()) }),
        )
        .await;
    assert_eq!(status, 502);
    assert_eq!(body["code"], "RESOLUTION_FAILED");

    let client = registry.client(&broken.uri());
    assert!(matches!(
        client.register().await,
        Err(RegistryError::RegistryUnavailable(_))
    ));
    assert!(client.list().await.unwrap().is_empty());

    registry.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_registrations_of_one_url_yield_one_entry() {
    let registry = RunningRegistry::start(300, 60).await;
    let agent = card_host("Echo", &[]).await;
    let client = registry.client(&agent.uri());

    let attempts = (0..8).map(|_| client.register());
    let results = futures::future::join_all(attempts).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let agents = client.list().await.unwrap();
    assert_eq!(agents.len(), 1);

    registry.shutdown().await;
}

#[tokio::test]
async fn test_reaper_removes_agents_that_stop_registering() {
    let registry = RunningRegistry::start(2, 1).await;
    let (status, _) = registry
        .post_json(
            "/register",
            json!({ "agent_url": "http://quiet-agent:9000", "name": "Quiet" }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, health) = registry.get_json("/health").await;
    assert_eq!(health["agents"], 1);

    tokio::time::sleep(Duration::from_millis(3500)).await;

    let (_, listing) = registry.get_json("/agents").await;
    assert_eq!(listing["agents"].as_array().map(|a| a.len()), Some(0));
    let (status, _) = registry.get_json("/agents/http://quiet-agent:9000").await;
    assert_eq!(status, 404);

    registry.shutdown().await;
}
