//! TOML file source: an explicit path passed with `--config`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Add a required TOML file layer to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = path
        .to_str()
        .ok_or_else(|| ConfigError::Message(format!("Non UTF-8 config path: {}", path.display())))?;
    Ok(builder.add_source(File::new(path, FileFormat::Toml).required(true)))
}
