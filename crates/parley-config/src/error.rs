use std::path::PathBuf;

/// Errors from loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::RelayConfig`]
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// A required setting has no value
    #[error("missing required setting `{setting}` (set {env})")]
    Missing {
        /// Config file key
        setting: &'static str,
        /// Environment variable that supplies it
        env: &'static str,
    },

    /// A setting has an unusable value
    #[error("invalid value for `{setting}`: {reason}")]
    Invalid {
        /// Setting or variable name
        setting: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
