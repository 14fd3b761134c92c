//! Manager configuration
//!
//! Loaded from TOML, either standalone or embedded in the CLI configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Provider whose identities make up the public relation list
pub const DEFAULT_IDENTITY_PROVIDER: &str = "organization";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration field {field}: {reason}")]
    Invalid {
        /// Field name
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Configuration for the relationship manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Identity provider listed by `get_public_relation`
    #[serde(default = "default_identity_provider")]
    pub identity_provider: String,

    /// Log every lifecycle transition at info level (debug otherwise)
    #[serde(default = "default_log_transitions")]
    pub log_transitions: bool,
}

fn default_identity_provider() -> String {
    DEFAULT_IDENTITY_PROVIDER.to_string()
}

fn default_log_transitions() -> bool {
    true
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            identity_provider: default_identity_provider(),
            log_transitions: default_log_transitions(),
        }
    }
}

impl ManagerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ManagerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_provider.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "identity_provider".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Use a different identity provider for the public relation list
    pub fn with_identity_provider(mut self, provider: impl Into<String>) -> Self {
        self.identity_provider = provider.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.identity_provider, "organization");
        assert!(config.log_transitions);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            identity_provider = "ldap"
            log_transitions = false
        "#;

        let config: ManagerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.identity_provider, "ldap");
        assert!(!config.log_transitions);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ManagerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "identity_provider = \"space\"").unwrap();

        let config = ManagerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.identity_provider, "space");
    }

    #[test]
    fn test_from_file_rejects_empty_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "identity_provider = \"  \"").unwrap();

        let result = ManagerConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_from_missing_file() {
        let result = ManagerConfig::from_file("/nonexistent/rapport.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ManagerConfig::default().with_identity_provider("space");
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: ManagerConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
