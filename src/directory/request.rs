//! Wire request bodies and the registration variants they resolve to.

use crate::error::{RegistryError, RegistryResult};
use crate::registry::{canonicalize_url, AgentProfile, AgentRecord};
use serde::{Deserialize, Serialize};

/// Body of `POST /register`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

impl RegistrationRequest {
    pub fn for_agent(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: Some(agent_url.into()),
            ..Self::default()
        }
    }

    pub fn for_card(card_url: impl Into<String>) -> Self {
        Self {
            card_url: Some(card_url.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Body of `POST /heartbeat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub agent_url: String,
    /// Name to re-register under if the registry has lost the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A registration request reduced to one canonical shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// Metadata supplied by the caller; no card is fetched
    Explicit { url: String, profile: AgentProfile },
    /// Card fetched from the well-known path beneath `url`
    AgentUrl { url: String },
    /// Card fetched from `card_url` as-is. The key is `agent_url` when given,
    /// otherwise the URL the card advertises.
    CardUrl {
        card_url: String,
        agent_url: Option<String>,
        name: Option<String>,
    },
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<RegistrationRequest> for Registration {
    type Error = RegistryError;

    fn try_from(request: RegistrationRequest) -> RegistryResult<Self> {
        let agent_url = non_blank(request.agent_url)
            .map(|url| canonicalize_url(&url))
            .transpose()?;
        let card_url = non_blank(request.card_url)
            .map(|url| canonicalize_url(&url))
            .transpose()?;
        let name = non_blank(request.name);

        if let Some(card_url) = card_url {
            if request.description.is_some() || request.skills.is_some() {
                return Err(RegistryError::InvalidInput(
                    "description and skills come from the card when card_url is given"
                        .to_string(),
                ));
            }
            return Ok(Registration::CardUrl {
                card_url,
                agent_url,
                name,
            });
        }

        let url = agent_url.ok_or_else(|| {
            RegistryError::InvalidInput("Provide card_url or agent_url".to_string())
        })?;

        if name.is_none() && request.description.is_none() && request.skills.is_none() {
            return Ok(Registration::AgentUrl { url });
        }

        Ok(Registration::Explicit {
            url,
            profile: AgentProfile {
                name,
                description: request.description,
                skills: request.skills,
                ..AgentProfile::default()
            },
        })
    }
}

/// Body of `GET /agents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentListResponse {
    pub agents: Vec<AgentRecord>,
}

/// One entry of the discovery index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardReference {
    pub name: String,
    pub url: String,
    pub card_url: String,
}

/// Body of `GET /.well-known/agents/index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryIndex {
    pub agents: Vec<CardReference>,
}

impl From<&AgentRecord> for CardReference {
    fn from(record: &AgentRecord) -> Self {
        Self {
            name: record.name.clone(),
            url: record.url.clone(),
            card_url: record.card_reference(),
        }
    }
}
