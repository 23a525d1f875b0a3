//! Directory service: turns registration variants into store operations.
//!
//! The only place card resolution and the store meet. A failed resolution
//! returns before the store is touched, so a failed registration never leaves
//! a partial record behind.

use super::request::{CardReference, DiscoveryIndex, Registration};
use crate::card::CardResolver;
use crate::error::{RegistryError, RegistryResult, ResolveError};
use crate::registry::{canonicalize_url, AgentProfile, AgentRecord, RegistryStore};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Directory {
    store: Arc<RegistryStore>,
    resolver: Arc<dyn CardResolver>,
}

impl Directory {
    pub fn new(store: Arc<RegistryStore>, resolver: Arc<dyn CardResolver>) -> Self {
        Self { store, resolver }
    }

    pub fn store(&self) -> &Arc<RegistryStore> {
        &self.store
    }

    pub async fn register(&self, registration: Registration) -> RegistryResult<AgentRecord> {
        let record = match registration {
            Registration::Explicit { url, profile } => self.store.upsert(&url, profile)?,
            Registration::AgentUrl { url } => {
                let resolved = self.resolver.resolve_agent(&url).await?;
                self.store.upsert(&url, resolved.into_profile(None))?
            }
            Registration::CardUrl {
                card_url,
                agent_url,
                name,
            } => {
                let resolved = self.resolver.resolve_card(&card_url).await?;
                let url = match agent_url {
                    Some(url) => url,
                    None => canonicalize_url(&resolved.agent_url()).map_err(|e| {
                        RegistryError::resolution(
                            card_url.as_str(),
                            ResolveError::Malformed(format!("card advertises {}", e)),
                        )
                    })?,
                };
                self.store.upsert(&url, resolved.into_profile(name))?
            }
        };

        info!(
            url = %record.url,
            name = %record.name,
            skills = record.skills.len(),
            "Registered agent"
        );
        Ok(record)
    }

    /// Refresh liveness for `agent_url`. When the registry has no live record
    /// it re-registers: under `name` if one is given, otherwise through the
    /// agent's card.
    pub async fn heartbeat(
        &self,
        agent_url: &str,
        name: Option<String>,
    ) -> RegistryResult<AgentRecord> {
        let url = canonicalize_url(agent_url)?;
        match self.store.touch(&url) {
            Ok(record) => {
                debug!(url = %record.url, "Heartbeat refreshed agent");
                Ok(record)
            }
            Err(RegistryError::NotFound(_)) => {
                debug!(url = %url, "Heartbeat for unknown agent, registering");
                let registration = match name.filter(|n| !n.trim().is_empty()) {
                    Some(name) => Registration::Explicit {
                        url,
                        profile: AgentProfile::named(name.trim()),
                    },
                    None => Registration::AgentUrl { url },
                };
                self.register(registration).await
            }
            Err(e) => Err(e),
        }
    }

    pub fn list(&self) -> Vec<AgentRecord> {
        self.store.list()
    }

    pub fn get(&self, agent_url: &str) -> Option<AgentRecord> {
        self.store.get(agent_url)
    }

    pub fn discovery_index(&self) -> DiscoveryIndex {
        DiscoveryIndex {
            agents: self.store.list().iter().map(CardReference::from).collect(),
        }
    }

    /// Idempotent delete; returns whether a record existed
    pub fn unregister(&self, agent_url: &str) -> bool {
        let removed = self.store.remove(agent_url);
        if removed {
            info!(url = %agent_url, "Unregistered agent");
        } else {
            debug!(url = %agent_url, "Unregister for unknown agent");
        }
        removed
    }
}
