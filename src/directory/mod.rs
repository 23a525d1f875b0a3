//! Directory API
//!
//! The network surface of the registry: register, heartbeat, list, unregister
//! and a discovery index in the common `agents/index.json` shape. All logic is
//! delegated to the registry store and the card resolver.

pub mod format;
pub mod handlers;
pub mod request;
pub mod router;
pub mod server;
pub mod service;
pub mod state;

pub use format::format_agent_list_text;
pub use request::{
    AgentListResponse, CardReference, DiscoveryIndex, HeartbeatRequest, Registration,
    RegistrationRequest,
};
pub use router::create_router;
pub use server::{shutdown_signal, DirectoryServer};
pub use service::Directory;
pub use state::AppState;
