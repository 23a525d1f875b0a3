//! Merge policy: the default layer every other source overrides.

use crate::config::RegistryConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder seeded with `RegistryConfig::default()`.
///
/// Seeding every key up front lets a partial file or a single env var
/// override one field without blanking its siblings.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = RegistryConfig::default();
    let logging = &defaults.logging;

    let builder = Config::builder()
        .set_default("host", defaults.host.clone())?
        .set_default("port", defaults.port as i64)?
        .set_default("ttl_secs", defaults.ttl_secs as i64)?
        .set_default("sweep_interval_secs", defaults.sweep_interval_secs as i64)?
        .set_default("resolve_timeout_secs", defaults.resolve_timeout_secs as i64)?
        .set_default("logging.enabled", logging.enabled)?
        .set_default("logging.level", logging.level.clone())?
        .set_default("logging.format", logging.format.clone())?
        .set_default("logging.output", logging.output.clone())?
        .set_default("logging.color", logging.color)?;

    Ok(builder)
}
