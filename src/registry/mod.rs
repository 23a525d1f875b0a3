//! Agent registry core: records, the store that owns them, and the reaper that
//! prunes the ones that stopped sending heartbeats.

pub mod clock;
pub mod reaper;
pub mod record;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reaper::{Reaper, DEFAULT_SWEEP_INTERVAL};
pub use record::{canonicalize_url, AgentProfile, AgentRecord, ProviderInfo, UNKNOWN_AGENT_NAME};
pub use store::{RegistryStore, DEFAULT_TTL};
