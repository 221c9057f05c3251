//! Configuration file loading and validation.

use std::path::{Component, Path};

use crate::error::ConfigError;
use crate::types::RivetConfig;

/// Name of the configuration file at the workspace root.
pub const CONFIG_FILE: &str = "rivet.toml";

/// Loads and validates `rivet.toml` from a workspace directory.
///
/// A missing file is not an error: defaults are returned.
pub fn load_config(workspace_root: &Path) -> Result<RivetConfig, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE);
    match std::fs::read_to_string(&config_path) {
        Ok(content) => load_config_from_str(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RivetConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<RivetConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates `rivet.toml` content from a string.
pub fn load_config_from_str(content: &str) -> Result<RivetConfig, ConfigError> {
    let config: RivetConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// The cache directory must be a non-empty path that stays inside the workspace.
fn validate_config(config: &RivetConfig) -> Result<(), ConfigError> {
    let dir = Path::new(&config.cache.dir);
    if config.cache.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "cache.dir must not be empty".to_string(),
        ));
    }
    if dir.is_absolute() {
        return Err(ConfigError::ValidationError(format!(
            "cache.dir must be relative to the workspace root, got '{}'",
            config.cache.dir
        )));
    }
    if dir.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ConfigError::ValidationError(format!(
            "cache.dir must not leave the workspace root, got '{}'",
            config.cache.dir
        )));
    }
    Ok(())
}
