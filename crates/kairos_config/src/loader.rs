//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::AnalysisConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "kairos.toml";

/// Loads and validates `<dir>/kairos.toml`.
pub fn load_config(dir: &Path) -> Result<AnalysisConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<AnalysisConfig, ConfigError> {
    let config: AnalysisConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if config.analysis.threads == Some(0) {
        return Err(ConfigError::InvalidValue {
            key: "analysis.threads",
            reason: "must be at least 1",
        });
    }
    if config.report.max_critical_paths == 0 {
        return Err(ConfigError::InvalidValue {
            key: "report.max_critical_paths",
            reason: "must be at least 1",
        });
    }
    Ok(())
}
