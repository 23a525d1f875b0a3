//! Tooling & Integration Layer
//!
//! Command-line front end for running the registry and for talking to a
//! running one from scripts or agent start-up hooks.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, ListFormat};
