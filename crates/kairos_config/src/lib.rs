//! Parsing and validation of `kairos.toml` analysis configuration.
//!
//! The configuration selects the traversal strategy (and its thread count)
//! and controls what the analyzer reports after a run. Every section is
//! optional; an empty file yields [`AnalysisConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
