//! Configuration loading and validation.
//!
//! Settings come from an optional TOML file, then environment overrides
//! (`FACEIT_API_KEY`, `PLAYER_NAME`, `PORT`), then command-line flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculate::SessionWindow;
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("FACEIT API key missing: set FACEIT_API_KEY or faceit.api_key")]
    MissingCredential,

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceitConfig {
    /// Bearer credential for the Data API
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Player reported when a request names none
    #[serde(default = "default_player")]
    pub default_player: String,

    /// Game id used for levels, elo and stats
    #[serde(default = "default_game")]
    pub game: String,

    /// Recent matches fetched per stats request
    #[serde(default = "default_match_limit")]
    pub match_limit: u32,

    /// Search results returned when the request sets no limit
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://open.faceit.com/data/v4".to_string()
}

fn default_player() -> String {
    "piK".to_string()
}

fn default_game() -> String {
    "cs2".to_string()
}

fn default_match_limit() -> u32 {
    30
}

fn default_search_limit() -> u32 {
    5
}

fn default_timeout() -> u64 {
    10
}

impl Default for FaceitConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            default_player: default_player(),
            game: default_game(),
            match_limit: default_match_limit(),
            search_limit: default_search_limit(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Directory holding the search, overlay and test pages
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_static_dir() -> String {
    "./static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: default_static_dir(),
        }
    }
}

/// Longest accepted lookback or gap threshold.
const MAX_SESSION_SPAN: Duration = Duration::from_secs(365 * 24 * 3600);

/// Session inference bounds, as duration strings ("24h", "90m").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_lookback")]
    pub lookback: String,

    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: String,
}

fn default_lookback() -> String {
    "24h".to_string()
}

fn default_gap_threshold() -> String {
    "6h".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            gap_threshold: default_gap_threshold(),
        }
    }
}

impl SessionConfig {
    pub fn window(&self) -> Result<SessionWindow, ConfigError> {
        Ok(SessionWindow {
            lookback: duration_field("session.lookback", &self.lookback)?,
            gap_threshold: duration_field("session.gap_threshold", &self.gap_threshold)?,
        })
    }
}

/// Response cache lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl")]
    pub stats_ttl: String,

    #[serde(default = "default_ttl")]
    pub search_ttl: String,
}

fn default_ttl() -> String {
    "5m".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stats_ttl: default_ttl(),
            search_ttl: default_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn stats_ttl(&self) -> Result<Duration, ConfigError> {
        duration_field("cache.stats_ttl", &self.stats_ttl)
    }

    pub fn search_ttl(&self) -> Result<Duration, ConfigError> {
        duration_field("cache.search_ttl", &self.search_ttl)
    }
}

fn duration_field(name: &str, value: &str) -> Result<Duration, ConfigError> {
    parse_duration(value).ok_or_else(|| {
        ConfigError::ValidationError(format!("{} is not a duration: {:?}", name, value))
    })
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub faceit: FaceitConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            faceit: FaceitConfig::default(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if it exists and apply environment overrides.
    ///
    /// Not validated; callers apply their own overrides first.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("FACEIT_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.faceit.api_key = key.trim().to_string();
        }

        if let Some(player) = lookup("PLAYER_NAME").filter(|p| !p.trim().is_empty()) {
            self.faceit.default_player = player.trim().to_string();
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT is not a valid port: {:?}", port))
            })?;
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.faceit.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }

        if self.faceit.default_player.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Default player must not be empty".to_string(),
            ));
        }

        if self.faceit.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }

        if self.faceit.match_limit == 0 || self.faceit.match_limit > 100 {
            return Err(ConfigError::ValidationError(
                "Match limit must be between 1 and 100".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let window = self.session.window()?;
        if window.gap_threshold.is_zero() {
            return Err(ConfigError::ValidationError(
                "Session gap threshold must be greater than 0".to_string(),
            ));
        }
        if window.lookback > MAX_SESSION_SPAN || window.gap_threshold > MAX_SESSION_SPAN {
            return Err(ConfigError::ValidationError(
                "Session lookback and gap threshold must be at most 365 days".to_string(),
            ));
        }

        self.cache.stats_ttl()?;
        self.cache.search_ttl()?;

        Ok(())
    }
}
