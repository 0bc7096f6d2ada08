use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the backend base URL
pub const URL_ENV: &str = "DOCS_ASSISTANT_URL";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the documentation site
    pub base_url: String,

    /// Path of the ask endpoint on the site
    pub ask_path: String,

    /// HTTP client timeout in seconds
    pub request_timeout_secs: u64,

    /// docs-assistant home directory (config and log file)
    #[serde(skip)]
    pub home: PathBuf,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
    pub show_sources: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            show_sources: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            base_url: "http://localhost:8080".to_string(),
            ask_path: "/api/ai/ask".to_string(),
            request_timeout_secs: 60,
            home: home.join(".docs-assistant"),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from ~/.docs-assistant/config.toml and the environment
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let mut config = Self::load_from(&home.join(".docs-assistant"))?;

        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific home directory
    pub fn load_from(home: &Path) -> Result<Self> {
        let config_path = home.join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content)
                .context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.home = home.to_path_buf();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.home)
            .context("Failed to create .docs-assistant directory")?;
        let content = self.to_toml()?;
        fs::write(self.config_path(), content)
            .context("Failed to write config file")?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.home.join("docs-assistant.log")
    }

    /// Full URL of the ask endpoint
    pub fn ask_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.ask_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_docs_site() {
        let config = Config::default();
        assert_eq!(config.ask_url(), "http://localhost:8080/api/ai/ask");
    }

    #[test]
    fn ask_url_does_not_double_slashes() {
        let config = Config {
            base_url: "https://docs.example.com/".to_string(),
            ask_path: "/api/ai/ask".to_string(),
            ..Config::default()
        };
        assert_eq!(config.ask_url(), "https://docs.example.com/api/ai/ask");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.home, dir.path());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path()).unwrap();
        config.base_url = "https://docs.internal".to_string();
        config.ui.show_sources = false;
        config.save().unwrap();

        let loaded = Config::load_from(dir.path()).unwrap();
        assert_eq!(loaded.base_url, "https://docs.internal");
        assert!(!loaded.ui.show_sources);
        assert_eq!(loaded.request_timeout_secs, 60);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "request_timeout_secs = 5\n").unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.ask_path, "/api/ai/ask");
        assert!(config.ui.show_timestamps);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "base_url = [").unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }
}
