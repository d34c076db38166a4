//! Client configuration management

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client: ClientSettings,
    pub device: DeviceSettings,
    #[serde(default)]
    pub live: LiveSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    pub log_level: String,
    /// Log file used while the terminal UI owns the screen
    /// If None, uses ~/.local/share/topdon-remote/client.log
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Base URL of the camera web service
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where downloaded captures are written
    /// If None, uses the user's download directory
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSettings {
    pub enabled: bool,
    /// Socket.IO event carrying frames
    pub event: String,
    pub reconnect: bool,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    pub tick_rate_ms: u64,
    /// Wait for the toggle request to finish before re-polling the
    /// recording status. Off by default: both requests race.
    pub sequence_toggle_poll: bool,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            event: protocol::FRAME_EVENT.to_string(),
            reconnect: true,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30_000,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            sequence_toggle_poll: false,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client: ClientSettings {
                log_level: "info".to_string(),
                log_file: None,
                language: Language::En,
            },
            device: DeviceSettings {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
                download_dir: None,
            },
            live: LiveSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl ClientConfig {
    /// Request timeout for the HTTP client
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.device.request_timeout_secs)
    }

    /// Directory downloads are written to
    pub fn download_dir(&self) -> PathBuf {
        match &self.device.download_dir {
            Some(dir) => expand_path(dir),
            None => dirs::download_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Log file used in TUI mode
    pub fn log_file(&self) -> PathBuf {
        match &self.client.log_file {
            Some(path) => expand_path(path),
            None => dirs::data_local_dir()
                .map(|d| d.join("topdon-remote").join("client.log"))
                .unwrap_or_else(|| PathBuf::from("topdon-remote.log")),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            expand_path(&p)
        } else {
            // Try standard locations in order
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/topdon-remote/client.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        tracing::debug!(
            "Config: device={}, live={}, language={:?}",
            config.device.base_url,
            config.live.enabled,
            config.client.language
        );
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                // Print to stderr since logging might not be initialized yet
                eprintln!("Config: {:#}", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("topdon-remote").join("client.toml")
        } else {
            PathBuf::from(".config/topdon-remote/client.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.client.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.client.log_level,
                valid_levels.join(", ")
            ));
        }

        let url = Url::parse(&self.device.base_url)
            .with_context(|| format!("Invalid base_url '{}'", self.device.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            ));
        }

        if self.device.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than 0"));
        }

        if self.live.event.is_empty() {
            return Err(anyhow!("live.event must not be empty"));
        }
        if self.live.initial_backoff_ms == 0 || self.live.initial_backoff_ms > self.live.max_backoff_ms {
            return Err(anyhow!(
                "live backoff must satisfy 0 < initial_backoff_ms <= max_backoff_ms ({} / {})",
                self.live.initial_backoff_ms,
                self.live.max_backoff_ms
            ));
        }

        if self.ui.tick_rate_ms == 0 {
            return Err(anyhow!("ui.tick_rate_ms must be greater than 0"));
        }

        Ok(())
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.client.log_level, "info");
        assert_eq!(config.client.language, Language::En);
        assert_eq!(config.device.base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.live.enabled);
        assert_eq!(config.live.event, "update_frame");
        assert!(!config.ui.sequence_toggle_poll);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = ClientConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.client.log_level, parsed.client.log_level);
        assert_eq!(config.device.base_url, parsed.device.base_url);
        assert_eq!(config.live.max_backoff_ms, parsed.live.max_backoff_ms);
    }

    #[test]
    fn test_minimal_file_uses_section_defaults() {
        let config = ClientConfig::from_toml(
            r#"
[client]
log_level = "debug"
language = "de"

[device]
base_url = "http://192.168.1.20:5000"
"#,
        )
        .unwrap();

        assert_eq!(config.client.language, Language::De);
        assert_eq!(config.device.request_timeout_secs, 30);
        assert!(config.live.reconnect);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = ClientConfig::default();
        assert!(config.validate().is_ok());

        config.client.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.client.log_level = "trace".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = ClientConfig::default();

        config.device.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.device.base_url = "ftp://camera.local".to_string();
        assert!(config.validate().is_err());

        config.device.base_url = "https://camera.local:8443".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_backoff() {
        let mut config = ClientConfig::default();
        config.live.initial_backoff_ms = 60_000;
        assert!(config.validate().is_err());

        config.live.initial_backoff_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_download_dir() {
        let mut config = ClientConfig::default();
        config.device.download_dir = Some(PathBuf::from("/tmp/captures"));
        assert_eq!(config.download_dir(), PathBuf::from("/tmp/captures"));
    }
}
