use super::harness::{card_host, RunningRegistry};
use std::time::Duration;

#[tokio::test]
async fn test_heartbeat_keeps_agent_alive_past_ttl() {
    let registry = RunningRegistry::start(2, 1).await;
    let agent = card_host("Weather", &["forecast"]).await;

    let handle = registry
        .heartbeat_client(&agent.uri(), Duration::from_millis(500))
        .spawn();

    tokio::time::sleep(Duration::from_millis(3500)).await;
    let agents = registry.client(&agent.uri()).list().await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "Weather");
    assert!(agents[0].last_seen > agents[0].registered_at);

    handle.stop().await;
    registry.shutdown().await;
}

#[tokio::test]
async fn test_stopped_heartbeat_lets_entry_expire() {
    let registry = RunningRegistry::start(2, 1).await;
    let agent = card_host("Timer", &[]).await;

    let handle = registry
        .heartbeat_client(&agent.uri(), Duration::from_millis(500))
        .spawn();
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(registry.client(&agent.uri()).list().await.unwrap().len(), 1);

    handle.stop().await;
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert!(registry.client(&agent.uri()).list().await.unwrap().is_empty());

    registry.shutdown().await;
}

#[tokio::test]
async fn test_heartbeat_survives_registry_outage() {
    let agent = card_host("Resilient", &[]).await;
    let handle = agent_registry::heartbeat::HeartbeatClient::new(
        agent_registry::heartbeat::HeartbeatConfig::new("http://127.0.0.1:9", agent.uri())
            .with_interval(Duration::from_millis(100))
            .with_request_timeout(Duration::from_millis(500)),
    )
    .unwrap()
    .spawn();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!handle.is_finished());
    handle.stop().await;
}

#[tokio::test]
async fn test_heartbeat_after_unregister_keeps_configured_name() {
    let registry = RunningRegistry::start(30, 5).await;
    let agent = card_host("CardName", &[]).await;
    let client = registry.named_client(&agent.uri(), "Configured");

    assert_eq!(client.register().await.unwrap().name, "Configured");
    client.unregister().await.unwrap();

    let record = client.heartbeat().await.unwrap();
    assert_eq!(record.name, "Configured");
    let agents = client.list().await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "Configured");

    registry.shutdown().await;
}
