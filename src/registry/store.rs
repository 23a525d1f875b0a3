//! Registry Store
//!
//! Authoritative in-memory table of registered agents keyed by canonical agent
//! URL. Every mutation happens under one write lock, so readers never see a
//! half-updated record and two calls for the same URL resolve in a definite
//! order. Reads filter by expiry, whether or not the reaper has already swept
//! the entry.

use super::clock::{Clock, SystemClock};
use super::record::{canonicalize_url, AgentProfile, AgentRecord, UNKNOWN_AGENT_NAME};
use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default time-to-live for a record without a heartbeat
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

pub struct RegistryStore {
    records: RwLock<HashMap<String, AgentRecord>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl RegistryStore {
    /// Create a store backed by the wall clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            records: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::milliseconds(ttl_ms),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or_default()
    }

    fn expiry_for(&self, last_seen: DateTime<Utc>) -> DateTime<Utc> {
        last_seen
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Insert or refresh the record for `url`.
    ///
    /// Descriptive fields the profile leaves out keep their stored values.
    /// `last_seen` never moves backwards for a live record.
    pub fn upsert(&self, url: &str, profile: AgentProfile) -> RegistryResult<AgentRecord> {
        let key = canonicalize_url(url)?;
        let now = self.clock.now();

        let mut records = self.records.write();
        let record = match records.get_mut(&key) {
            Some(existing) if existing.is_live(now) => {
                existing.last_seen = existing.last_seen.max(now);
                existing.expires_at = self.expiry_for(existing.last_seen);
                existing.apply(profile);
                existing.clone()
            }
            _ => {
                let mut record = AgentRecord {
                    name: UNKNOWN_AGENT_NAME.to_string(),
                    description: String::new(),
                    url: key.clone(),
                    card_url: None,
                    skills: Vec::new(),
                    version: None,
                    provider: None,
                    registered_at: now,
                    last_seen: now,
                    expires_at: self.expiry_for(now),
                    card: None,
                };
                record.apply(profile);
                records.insert(key, record.clone());
                record
            }
        };

        Ok(record)
    }

    /// Refresh liveness without touching descriptive fields.
    ///
    /// Fails with `NotFound` when no live record exists; the caller falls back
    /// to a full `upsert`.
    pub fn touch(&self, url: &str) -> RegistryResult<AgentRecord> {
        let key = canonicalize_url(url)?;
        let now = self.clock.now();

        let mut records = self.records.write();
        match records.get_mut(&key) {
            Some(existing) if existing.is_live(now) => {
                existing.last_seen = existing.last_seen.max(now);
                existing.expires_at = self.expiry_for(existing.last_seen);
                Ok(existing.clone())
            }
            _ => Err(RegistryError::NotFound(key)),
        }
    }

    /// Live record for `url`, if any
    pub fn get(&self, url: &str) -> Option<AgentRecord> {
        let key = canonicalize_url(url).ok()?;
        let now = self.clock.now();
        self.records
            .read()
            .get(&key)
            .filter(|record| record.is_live(now))
            .cloned()
    }

    /// All live records, most recently seen first.
    ///
    /// Ties on `last_seen` are broken by URL so the order is deterministic.
    pub fn list(&self) -> Vec<AgentRecord> {
        let now = self.clock.now();
        let mut live: Vec<AgentRecord> = self
            .records
            .read()
            .values()
            .filter(|record| record.is_live(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then_with(|| a.url.cmp(&b.url)));
        live
    }

    /// Delete the record for `url`; returns whether one was removed.
    ///
    /// A URL that cannot be canonicalized can never have been stored, so it
    /// simply removes nothing.
    pub fn remove(&self, url: &str) -> bool {
        match canonicalize_url(url) {
            Ok(key) => self.records.write().remove(&key).is_some(),
            Err(_) => false,
        }
    }

    /// Remove every record whose deadline has passed; returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, record| record.is_live(now));
        before - records.len()
    }

    /// Number of live records
    pub fn live_count(&self) -> usize {
        let now = self.clock.now();
        self.records
            .read()
            .values()
            .filter(|record| record.is_live(now))
            .count()
    }

    /// Number of records physically held, expired or not
    pub fn physical_count(&self) -> usize {
        self.records.read().len()
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
