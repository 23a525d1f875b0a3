//! Agent records held by the registry store.

use crate::error::RegistryError;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Name used when neither the caller nor the card supplies one.
pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";

/// Publisher of an agent, as advertised in its card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub organization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One registered agent
///
/// Keyed by `url`. `expires_at` is always `last_seen + ttl` for the store that
/// produced the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_url: Option<String>,
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderInfo>,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Raw card document as fetched, served by the card endpoint only
    #[serde(skip)]
    pub card: Option<serde_json::Value>,
}

impl AgentRecord {
    /// Whether the record is still live at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Card reference advertised in the discovery index
    pub fn card_reference(&self) -> String {
        self.card_url
            .clone()
            .unwrap_or_else(|| crate::card::well_known_card_url(&self.url))
    }

    /// Overwrite descriptive fields with whatever the profile supplies.
    pub(crate) fn apply(&mut self, profile: AgentProfile) {
        if let Some(name) = profile.name {
            self.name = name;
        }
        if let Some(description) = profile.description {
            self.description = description;
        }
        if let Some(skills) = profile.skills {
            self.skills = skills;
        }
        if profile.card_url.is_some() {
            self.card_url = profile.card_url;
        }
        if profile.version.is_some() {
            self.version = profile.version;
        }
        if profile.provider.is_some() {
            self.provider = profile.provider;
        }
        if profile.card.is_some() {
            self.card = profile.card;
        }
    }
}

/// Descriptive fields supplied with a registration.
///
/// `None` means "not supplied": on update the stored value is kept, on insert
/// the field takes its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentProfile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub card_url: Option<String>,
    pub version: Option<String>,
    pub provider: Option<ProviderInfo>,
    pub card: Option<serde_json::Value>,
}

impl AgentProfile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }
}

/// Canonicalize an agent URL into its registry key.
///
/// Accepts absolute `http`/`https` URLs with a host. The key is the parsed
/// form: scheme and host lowercased, default port dropped, trailing slashes
/// removed. `HTTP://H1:80/` and `http://h1` are the same key.
pub fn canonicalize_url(raw: &str) -> Result<String, RegistryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::InvalidInput("URL is required".to_string()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| RegistryError::InvalidInput(format!("Invalid URL '{}': {}", trimmed, e)))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(RegistryError::InvalidInput(format!(
                "Unsupported URL scheme '{}' in '{}'",
                other, trimmed
            )))
        }
    }
    if parsed.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(RegistryError::InvalidInput(format!(
            "URL '{}' has no host",
            trimmed
        )));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
