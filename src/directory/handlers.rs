//! HTTP handlers. Each one translates between the wire and the directory
//! service and does nothing else.

use super::request::{
    AgentListResponse, DiscoveryIndex, HeartbeatRequest, Registration, RegistrationRequest,
};
use super::state::AppState;
use crate::error::{RegistryError, RegistryResult};
use crate::registry::AgentRecord;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CARD_SUFFIX: &str = "/card";

/// Unregister response body
#[derive(Debug, Serialize, Deserialize)]
pub struct UnregisterResponse {
    pub status: String,
}

/// Health response body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub agents: usize,
    pub version: String,
    pub uptime: String,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> RegistryResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RegistryError::InvalidInput(rejection.body_text()))
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> RegistryResult<Json<AgentRecord>> {
    let registration = Registration::try_from(json_body(body)?)?;
    let record = state.directory.register(registration).await?;
    Ok(Json(record))
}

/// `POST /heartbeat`
pub async fn heartbeat(
    State(state): State<AppState>,
    body: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> RegistryResult<Json<AgentRecord>> {
    let request = json_body(body)?;
    let record = state
        .directory
        .heartbeat(&request.agent_url, request.name)
        .await?;
    Ok(Json(record))
}

/// `GET /agents`
pub async fn list_agents(State(state): State<AppState>) -> Json<AgentListResponse> {
    Json(AgentListResponse {
        agents: state.directory.list(),
    })
}

/// `GET /.well-known/agents/index.json`
pub async fn discovery_index(State(state): State<AppState>) -> Json<DiscoveryIndex> {
    Json(state.directory.discovery_index())
}

/// `GET /agents/{agent_url}` and `GET /agents/{agent_url}/card`
pub async fn get_agent(
    State(state): State<AppState>,
    Path(agent_url): Path<String>,
) -> RegistryResult<Json<Value>> {
    let agent_url = agent_url.trim_start_matches('/');

    if let Some(base) = agent_url.strip_suffix(CARD_SUFFIX) {
        if let Some(card) = state.directory.get(base).and_then(|record| record.card) {
            return Ok(Json(card));
        }
        // An agent whose own URL ends in /card
        if state.directory.get(agent_url).is_none() {
            return Err(RegistryError::NotFound(format!(
                "No card stored for {}",
                base
            )));
        }
    }

    let record = state
        .directory
        .get(agent_url)
        .ok_or_else(|| RegistryError::NotFound(agent_url.to_string()))?;
    let value = serde_json::to_value(record)
        .map_err(|e| RegistryError::ConfigError(format!("Failed to encode record: {}", e)))?;
    Ok(Json(value))
}

/// `DELETE /agents/{agent_url}`; succeeds whether or not the agent was known
pub async fn unregister(
    State(state): State<AppState>,
    Path(agent_url): Path<String>,
) -> Json<UnregisterResponse> {
    state
        .directory
        .unregister(agent_url.trim_start_matches('/'));
    Json(UnregisterResponse {
        status: "unregistered".to_string(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        agents: state.directory.store().live_count(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}
