//! Agent Registry: Discovery and Liveness for A2A Agents
//!
//! A central directory where agents announce themselves by URL. Each entry is
//! enriched from the agent's self-published card, kept alive by periodic
//! heartbeats, and pruned by a background reaper once its TTL lapses.

pub mod card;
pub mod config;
pub mod directory;
pub mod error;
pub mod heartbeat;
pub mod logging;
pub mod registry;
pub mod tooling;
