//! Agent Cards
//!
//! The self-description document every agent serves beneath its public URL,
//! and the resolver that fetches it for registration.

pub mod resolver;

pub use resolver::{CardResolver, HttpCardResolver, DEFAULT_RESOLVE_TIMEOUT};

use crate::error::ResolveError;
use crate::registry::{AgentProfile, ProviderInfo};
use serde::{Deserialize, Serialize};

/// Relative path of the card beneath an agent's base URL
pub const WELL_KNOWN_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Card URL for an agent base URL
pub fn well_known_card_url(agent_url: &str) -> String {
    format!("{}{}", agent_url.trim_end_matches('/'), WELL_KNOWN_CARD_PATH)
}

/// Agent base URL for a card URL at the well-known location, if it is one
pub fn agent_url_from_card_url(card_url: &str) -> Option<String> {
    card_url
        .trim_end_matches('/')
        .strip_suffix(WELL_KNOWN_CARD_PATH)
        .map(|base| base.to_string())
        .filter(|base| !base.is_empty())
}

/// A skill entry as it appears in a card
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SkillDescriptor {
    /// Human-readable label: name, then id
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardProvider {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Fields of an agent card the registry cares about. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub provider: Option<CardProvider>,
    #[serde(default)]
    pub skills: Vec<SkillDescriptor>,
}

impl AgentCard {
    pub fn skill_labels(&self) -> Vec<String> {
        self.skills.iter().map(SkillDescriptor::label).collect()
    }

    fn provider_info(&self) -> Option<ProviderInfo> {
        let provider = self.provider.as_ref()?;
        let organization = provider
            .organization
            .clone()
            .or_else(|| provider.name.clone())
            .filter(|org| !org.is_empty())?;
        Some(ProviderInfo {
            organization,
            url: provider.url.clone().filter(|url| !url.is_empty()),
        })
    }
}

/// A fetched and parsed card, plus where it came from
#[derive(Debug, Clone)]
pub struct ResolvedCard {
    pub card_url: String,
    pub card: AgentCard,
    pub raw: serde_json::Value,
}

impl ResolvedCard {
    /// Parse a card document fetched from `card_url`
    pub fn parse(card_url: &str, raw: serde_json::Value) -> Result<Self, ResolveError> {
        if !raw.is_object() {
            return Err(ResolveError::Malformed(
                "card document is not a JSON object".to_string(),
            ));
        }
        let card: AgentCard = serde_json::from_value(raw.clone())
            .map_err(|e| ResolveError::Malformed(e.to_string()))?;
        if card.name.trim().is_empty() {
            return Err(ResolveError::Malformed("card name is empty".to_string()));
        }

        Ok(Self {
            card_url: card_url.to_string(),
            card,
            raw,
        })
    }

    /// Agent URL advertised by the card, else derived from the card location
    pub fn agent_url(&self) -> String {
        self.card
            .url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| agent_url_from_card_url(&self.card_url))
            .unwrap_or_else(|| self.card_url.clone())
    }

    /// Registration profile, with `name_override` winning over the card name
    pub fn into_profile(self, name_override: Option<String>) -> AgentProfile {
        let provider = self.card.provider_info();
        let skills = self.card.skill_labels();
        AgentProfile {
            name: Some(name_override.unwrap_or(self.card.name)),
            description: Some(self.card.description.unwrap_or_default()),
            skills: Some(skills),
            card_url: Some(self.card_url),
            version: self.card.version.filter(|v| !v.is_empty()),
            provider,
            card: Some(self.raw),
        }
    }
}
