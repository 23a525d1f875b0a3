//! MergeService: orchestrates sources, applies merge policy, deserializes to RegistryConfig.

use crate::config::sources::{environment, file};
use crate::config::RegistryConfig;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from the standard sources.
    /// Precedence: defaults (lowest) -> config file -> environment (highest).
    pub fn load(path: Option<&Path>) -> Result<RegistryConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = match path {
            Some(path) => file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
