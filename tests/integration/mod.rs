//! Integration tests driving a bound registry over real HTTP

mod harness;
mod heartbeat_roundtrip;
mod registry_lifecycle;
