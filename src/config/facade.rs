//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::RegistryConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults overlaid with environment variables.
    pub fn load() -> Result<RegistryConfig, ConfigError> {
        MergeService::load(None)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<RegistryConfig, ConfigError> {
        MergeService::load(Some(path))
    }
}
