//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;

/// Lowest selectable tunnel complexity
pub const MIN_COMPLEXITY: u32 = 1;
/// Highest selectable tunnel complexity
pub const MAX_COMPLEXITY: u32 = 10;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the tunnel backend HTTP API
    pub api_base_url: String,
    /// Base URL of the coordinate stream WebSocket endpoint
    pub ws_base_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Path of the local scoreboard file
    pub scoreboard_path: PathBuf,
    /// Player name sent during session registration
    pub player_name: String,
    /// Tunnel complexity (1..=10)
    pub complexity: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let complexity = match env::var("COMPLEXITY") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|c| (MIN_COMPLEXITY..=MAX_COMPLEXITY).contains(c))
                .ok_or(ConfigError::InvalidComplexity)?,
            Err(_) => MIN_COMPLEXITY,
        };

        Ok(Self {
            api_base_url: trim_trailing_slash(
                env::var("API_BASE_URL").map_err(|_| ConfigError::Missing("API_BASE_URL"))?,
            ),
            ws_base_url: trim_trailing_slash(
                env::var("WS_BASE_URL").map_err(|_| ConfigError::Missing("WS_BASE_URL"))?,
            ),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            scoreboard_path: env::var("SCOREBOARD_PATH")
                .unwrap_or_else(|_| "scoreboard.json".to_string())
                .into(),

            player_name: env::var("PLAYER_NAME").unwrap_or_else(|_| "pilot".to_string()),

            complexity,
        })
    }

    /// Full URL of the coordinate stream endpoint
    pub fn cave_stream_url(&self) -> String {
        format!("{}/cave", self.ws_base_url)
    }
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("COMPLEXITY must be an integer between {MIN_COMPLEXITY} and {MAX_COMPLEXITY}")]
    InvalidComplexity,
}
