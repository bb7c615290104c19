use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use quottie_cache::CacheError;

use crate::DataError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not find {0} directory")]
    MissingDir(&'static str),

    #[error("Could not open local store: {0}")]
    Storage(#[from] CacheError),

    #[error("Could not load preferences: {0}")]
    Preferences(#[from] DataError),
}

/// Settings for the data layer
///
/// Read from `<config dir>/quottie/config.toml`; anything missing takes its
/// default.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub paging: PagingConfig,
}

impl Config {
    /// Load config from default location, or defaults if there is no file
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::MissingDir("config"))?
            .join("quottie")
            .join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Base URL of the quote backend
    #[serde(default = "default_quotes_url")]
    pub quotes_url: String,

    /// Base URL of the wiki used for author portraits
    #[serde(default = "default_wiki_url")]
    pub wiki_url: String,

    /// Requested portrait width in pixels
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,

    /// Base URL of the GitHub REST API
    #[serde(default = "default_github_url")]
    pub github_url: String,

    /// Account shown on the about screen
    #[serde(default = "default_github_login")]
    pub github_login: String,
}

fn default_quotes_url() -> String {
    "https://api.quotable.io".to_string()
}

fn default_wiki_url() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_thumbnail_size() -> u32 {
    500
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_login() -> String {
    "ngapp-dev".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            quotes_url: default_quotes_url(),
            wiki_url: default_wiki_url(),
            thumbnail_size: default_thumbnail_size(),
            github_url: default_github_url(),
            github_login: default_github_login(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageConfig {
    /// SQLite file; defaults to `<data dir>/quottie/quottie.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Preferences file; defaults to `<data dir>/quottie/preferences.json`
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        Self::resolve(&self.database_path, "quottie.db")
    }

    pub fn preferences_path(&self) -> Result<PathBuf, ConfigError> {
        Self::resolve(&self.preferences_path, "preferences.json")
    }

    fn resolve(explicit: &Option<PathBuf>, file_name: &str) -> Result<PathBuf, ConfigError> {
        match explicit {
            Some(path) => Ok(path.clone()),
            None => Ok(dirs::data_dir()
                .ok_or(ConfigError::MissingDir("data"))?
                .join("quottie")
                .join(file_name)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_recent_search_limit")]
    pub recent_search_limit: u32,
}

fn default_page_size() -> u32 {
    20
}

fn default_recent_search_limit() -> u32 {
    10
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            recent_search_limit: default_recent_search_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.quotes_url, "https://api.quotable.io");
        assert_eq!(config.network.thumbnail_size, 500);
        assert_eq!(config.network.github_url, "https://api.github.com");
        assert_eq!(config.paging.page_size, 20);
        assert_eq!(config.paging.recent_search_limit, 10);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            [network]
            quotes_url = "http://localhost:4000"

            [paging]
            page_size = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.network.quotes_url, "http://localhost:4000");
        assert_eq!(config.network.wiki_url, "https://en.wikipedia.org");
        assert_eq!(config.network.github_login, "ngapp-dev");
        assert_eq!(config.paging.page_size, 5);
        assert_eq!(config.paging.recent_search_limit, 10);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quottie").join("config.toml");

        let mut config = Config::default();
        config.storage.database_path = Some(dir.path().join("db.sqlite"));
        config.paging.page_size = 50;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_explicit_storage_paths_win() {
        let storage = StorageConfig {
            database_path: Some(PathBuf::from("/tmp/q.db")),
            preferences_path: None,
        };
        assert_eq!(storage.database_path().unwrap(), PathBuf::from("/tmp/q.db"));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[paging\npage_size = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
