//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use rapport_manager::ManagerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Relationship manager settings
    #[serde(default)]
    pub manager: ManagerConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database file (defaults to `~/.rapport/rapport.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Standalone manager configuration file, replacing the `[manager]` table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the configuration and the default database.
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".rapport"))
    }

    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Load configuration from a file, or defaults if it does not exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        match &config.settings.manager_config {
            Some(manager_path) => config.manager = ManagerConfig::from_file(manager_path)?,
            None => config.manager.validate()?,
        }
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the database path: explicit override, configured path, default.
    pub fn database_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = cli_override {
            return Ok(path.to_path_buf());
        }
        match &self.settings.database {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::dir()?.join("rapport.db")),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            manager_config: None,
            log_level: default_log_level(),
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert!(config.settings.database.is_none());
        assert_eq!(config.settings.log_level, "warn");
        assert_eq!(config.manager.identity_provider, "organization");
    }

    #[test]
    fn test_parse_with_manager_table() {
        let toml = r#"
            [settings]
            database = "/tmp/people.db"
            format = "json"

            [manager]
            identity_provider = "space"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert_eq!(config.settings.database, Some(PathBuf::from("/tmp/people.db")));
        assert_eq!(config.manager.identity_provider, "space");
        assert!(config.manager.log_transitions);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.color = false;
        config.manager = config.manager.with_identity_provider("ldap");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.settings.color);
        assert_eq!(loaded.manager.identity_provider, "ldap");
    }

    #[test]
    fn test_load_rejects_empty_provider() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[manager]\nidentity_provider = \"\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(CliError::ManagerConfig(_))
        ));
    }

    #[test]
    fn test_standalone_manager_config() {
        let dir = TempDir::new().unwrap();
        let manager_path = dir.path().join("manager.toml");
        fs::write(&manager_path, "identity_provider = \"ldap\"\nlog_transitions = false\n")
            .unwrap();

        let path = dir.path().join("config.toml");
        let contents = format!(
            "[settings]\nmanager_config = {:?}\n\n[manager]\nidentity_provider = \"space\"\n",
            manager_path.display().to_string()
        );
        fs::write(&path, contents).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.manager.identity_provider, "ldap");
        assert!(!config.manager.log_transitions);
    }

    #[test]
    fn test_missing_standalone_manager_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[settings]\nmanager_config = \"/nonexistent/manager.toml\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(CliError::ManagerConfig(rapport_manager::ConfigError::FileRead(_)))
        ));
    }

    #[test]
    fn test_database_path_precedence() {
        let mut config = Config::default();
        config.settings.database = Some(PathBuf::from("configured.db"));

        let path = config.database_path(Some(Path::new("override.db"))).unwrap();
        assert_eq!(path, PathBuf::from("override.db"));

        let path = config.database_path(None).unwrap();
        assert_eq!(path, PathBuf::from("configured.db"));
    }
}
