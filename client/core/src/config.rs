//! TOML Configuration File Support
//!
//! Loads client settings from `~/.config/fumotion/client.toml`, with
//! environment overrides.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # Environment Variables
//!
//! - `FUMOTION_CONFIG`: alternate config file path
//! - `API_URL` / `FUMOTION_API_URL`: service base URL
//! - `FUMOTION_POLL_INTERVAL_MS`: chat refresh period
//! - `FUMOTION_SESSION_FILE`: session record location
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://fumotion.tech"
//!
//! [chat]
//! poll_interval_ms = 5000
//!
//! [session]
//! path = "/home/me/.fumotion-tui/config.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::polling::DEFAULT_POLL_INTERVAL;

/// Service address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://fumotion.tech";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Where the effective configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// At least one value from an environment variable
    Env,
    /// Values from the TOML configuration file
    File,
    /// Nothing configured
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Service base URL
    pub base_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Conversation refresh period in milliseconds
    pub poll_interval_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Session record location
    pub path: Option<PathBuf>,
}

/// Root of the TOML file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    pub api: ApiToml,
    pub chat: ChatToml,
    pub session: SessionToml,
}

// =============================================================================
// Effective Configuration
// =============================================================================

/// Effective client configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Service base URL, without trailing slash
    pub api_url: String,
    /// Chat refresh period
    pub poll_interval: Duration,
    /// Session record override (`None` = `~/.fumotion-tui/config.json`)
    pub session_path: Option<PathBuf>,
    /// Config file that was loaded, if any
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            session_path: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at another service address
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_url(&api_url.into()),
            ..Self::default()
        }
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api base_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "chat poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

// =============================================================================
// Loading
// =============================================================================

/// `$XDG_CONFIG_HOME/fumotion/client.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("fumotion").join("client.toml"))
}

/// Load configuration from the process environment and the config file
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    let env = |key: &str| std::env::var(key).ok();
    let path = env("FUMOTION_CONFIG")
        .map(PathBuf::from)
        .or_else(default_config_path);
    load_config_with(path, env)
}

/// Load configuration from a specific file (which may be absent) and the process environment
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
pub fn load_config_with<F>(path: Option<PathBuf>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, &env)?;
    config.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    if let Some(ref url) = toml.api.base_url {
        config.api_url = normalize_url(url);
    }
    if let Some(ms) = toml.chat.poll_interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }
    if let Some(ref path) = toml.session.path {
        config.session_path = Some(path.clone());
    }
}

fn apply_env_config<F>(config: &mut ClientConfig, env: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("FUMOTION_API_URL").or_else(|| non_empty("API_URL")) {
        config.api_url = normalize_url(&url);
        config.source = ConfigSource::Env;
    }

    if let Some(raw) = non_empty("FUMOTION_POLL_INTERVAL_MS") {
        let ms: u64 = raw.trim().parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "FUMOTION_POLL_INTERVAL_MS must be a number of milliseconds, got '{raw}'"
            ))
        })?;
        config.poll_interval = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }

    if let Some(path) = non_empty("FUMOTION_SESSION_FILE") {
        config.session_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("client.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "https://fumotion.tech");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.session_path, None);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("fumotion/client.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
            [api]
            base_url = "http://localhost:3000/"

            [chat]
            poll_interval_ms = 2000

            [session]
            path = "/tmp/fumotion-session.json"
            "#,
        );

        let config = load_config_with(Some(path.clone()), no_env).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(
            config.session_path,
            Some(PathBuf::from("/tmp/fumotion-session.json"))
        );
        assert_eq!(config.config_file_path, Some(path));
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_parse_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[chat]\npoll_interval_ms = 750\n");

        let config = load_config_with(Some(path), no_env).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_interval, Duration::from_millis(750));
    }

    #[test]
    fn test_missing_file_graceful() {
        let dir = TempDir::new().unwrap();
        let config = load_config_with(Some(dir.path().join("absent.toml")), no_env).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_malformed_toml_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[api\nbase_url = ");
        let err = load_config_with(Some(path), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[api]\nbase_url = \"http://file.example\"\n");
        let env = env_from(&[
            ("API_URL", "http://env.example/"),
            ("FUMOTION_POLL_INTERVAL_MS", "100"),
            ("FUMOTION_SESSION_FILE", "/tmp/s.json"),
        ]);

        let config = load_config_with(Some(path), env).unwrap();
        assert_eq!(config.api_url, "http://env.example");
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.session_path, Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_prefixed_url_wins() {
        let env = env_from(&[
            ("API_URL", "http://generic.example"),
            ("FUMOTION_API_URL", "http://specific.example"),
        ]);
        let config = load_config_with(None, env).unwrap();
        assert_eq!(config.api_url, "http://specific.example");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let env = env_from(&[("API_URL", "fumotion.tech")]);
        assert!(matches!(
            load_config_with(None, env),
            Err(ConfigError::ValidationError(_))
        ));

        let env = env_from(&[("FUMOTION_POLL_INTERVAL_MS", "soon")]);
        assert!(matches!(
            load_config_with(None, env),
            Err(ConfigError::ValidationError(_))
        ));

        let env = env_from(&[("FUMOTION_POLL_INTERVAL_MS", "0")]);
        assert!(matches!(
            load_config_with(None, env),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_config = ClientToml {
            api: ApiToml {
                base_url: Some("http://localhost:3000".into()),
            },
            chat: ChatToml {
                poll_interval_ms: Some(1000),
            },
            session: SessionToml::default(),
        };
        let text = toml::to_string(&toml_config).unwrap();
        let parsed: ClientToml = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(parsed.chat.poll_interval_ms, Some(1000));
    }
}
