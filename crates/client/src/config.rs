//! Client configuration using clubhours-client.toml

use chrono::FixedOffset;
use clubhours_core::calendar::offset_from_minutes;
use clubhours_core::constants::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_PATH: &str = "clubhours-client.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the server, e.g. http://localhost:8080
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Attempts per offline operation before it is dropped
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Minutes east of UTC for the club's local day
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            max_attempts: default_max_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
            utc_offset_minutes: 0,
        }
    }
}

impl ClientConfig {
    /// Load config from `path`, falling back to defaults when missing or invalid
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Error parsing {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Error reading {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn club_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }

    /// WebSocket URL of the realtime feed
    pub fn realtime_url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/ws", ws_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("server_url = \"https://club.example\"").unwrap();
        assert_eq!(config.server_url, "https://club.example");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn test_realtime_url() {
        let mut config = ClientConfig::default();
        assert_eq!(config.realtime_url(), "ws://localhost:8080/ws");
        config.server_url = "https://club.example/".to_string();
        assert_eq!(config.realtime_url(), "wss://club.example/ws");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);

        let config = ClientConfig {
            utc_offset_minutes: -420,
            max_attempts: 5,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ClientConfig::load(&path), config);
        assert_eq!(config.club_offset().local_minus_utc(), -420 * 60);

        assert_eq!(ClientConfig::load(dir.path().join("missing.toml")), ClientConfig::default());
    }
}
