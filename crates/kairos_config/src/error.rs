//! Errors raised while reading `kairos.toml`.

use std::path::PathBuf;

/// Why a configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read, or does not exist.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// The file that was opened.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// The content is not valid TOML or does not match the schema.
    #[error("malformed configuration: {0}")]
    Syntax(#[from] toml::de::Error),

    /// A well-formed value is outside its allowed range.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Dotted key, e.g. `analysis.threads`.
        key: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_names_key() {
        let err = ConfigError::InvalidValue {
            key: "analysis.threads",
            reason: "must be at least 1",
        };
        assert_eq!(
            err.to_string(),
            "invalid value for `analysis.threads`: must be at least 1"
        );
    }

    #[test]
    fn read_error_shows_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/tmp/x/kairos.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.starts_with("cannot read /tmp/x/kairos.toml"));
        assert!(text.ends_with("no such file"));
    }
}
