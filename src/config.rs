use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::Deserialize;

use crate::theme::ThemeConfig;

const APP_DIR: &str = "events-tui";

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_DOCUMENTS_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub data: DataConfig,
    pub remote: RemoteConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Zone the stored wall-clock times are written in.
    pub source_timezone: String,
    /// Active zone at startup; the source zone when unset.
    pub timezone: Option<String>,
    /// "list" or "month"
    pub view: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            source_timezone: "America/Chicago".to_string(),
            timezone: None,
            view: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub events_file: Option<PathBuf>,
}

impl DataConfig {
    pub fn events_path(&self) -> PathBuf {
        self.events_file
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR).join("events.json")))
            .unwrap_or_else(|| PathBuf::from("events.json"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub collection: String,
    pub auth_url: String,
    pub documents_url: String,
    /// Accounts allowed to create events. Empty means any signed-in account.
    pub admins: Vec<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            project_id: None,
            collection: "events".to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            documents_url: DEFAULT_DOCUMENTS_URL.to_string(),
            admins: Vec::new(),
        }
    }
}

impl RemoteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(eyre!("[remote] api_key is required when the remote store is enabled"));
        }
        if self.project_id.as_deref().unwrap_or("").is_empty() {
            return Err(eyre!("[remote] project_id is required when the remote store is enabled"));
        }
        Ok(())
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

pub fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .map(|d| d.join(APP_DIR).join("events-tui.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("events-tui.log"))
}

impl Config {
    /// An explicit path must exist; the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match config_dir() {
                Some(dir) => dir.join("config.toml"),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit.is_some() {
                return Err(eyre!("Config file {} does not exist", path.display()));
            }
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("Invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.display.source_timezone, "America/Chicago");
        assert_eq!(config.remote.collection, "events");
        assert!(!config.remote.enabled);
        assert_eq!(config.remote.auth_url, DEFAULT_AUTH_URL);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r##"
            [display]
            timezone = "Europe/Berlin"
            view = "month"

            [data]
            events_file = "/tmp/events.json"

            [remote]
            enabled = true
            api_key = "abc"
            project_id = "racetracker"
            admins = ["me@example.com"]

            [theme]
            preset = "nord"

            [theme.categories]
            concert = "#ff00aa"
            "##,
        )
        .unwrap();
        assert_eq!(config.display.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(config.data.events_path(), PathBuf::from("/tmp/events.json"));
        assert!(config.remote.validate().is_ok());
        assert_eq!(config.remote.admins, vec!["me@example.com".to_string()]);
        assert_eq!(config.theme.categories.get("concert").map(String::as_str), Some("#ff00aa"));
    }

    #[test]
    fn test_remote_requires_credentials() {
        let config = Config::parse("[remote]\nenabled = true\n").unwrap();
        assert!(config.remote.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nsource_timezone = \"UTC\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.display.source_timezone, "UTC");
    }
}
