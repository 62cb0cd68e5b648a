//! Configuration management for lyricsbot.
//!
//! Configuration is read from `~/.config/lyricsbot/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! Credentials can always be supplied through the environment instead
//! (`TELEGRAM_TOKEN`, `GENIUS_TOKEN`), which takes precedence over the file.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const GENIUS_TOKEN_ENV: &str = "GENIUS_TOKEN";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub lyrics_ovh: LyricsOvhConfig,
    pub genius: GeniusConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub api_url: String,
    /// Long-poll timeout passed to `getUpdates`
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LyricsOvhConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LyricsOvhConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lyrics.ovh/v1".to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeniusConfig {
    /// Search is disabled entirely when unset
    pub token: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
    /// Hits whose title contains one of these (case-insensitive) are skipped
    pub excluded_terms: Vec<String>,
    /// Skip hits that look like track lists, liner notes, skits, ...
    pub skip_non_songs: bool,
}

impl Default for GeniusConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.genius.com".to_string(),
            timeout_secs: 10,
            excluded_terms: vec!["(Remix)".to_string(), "(Live)".to_string()],
            skip_non_songs: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on background fetches running at once
    pub max_concurrent_fetches: usize,
    /// Longest single message handed to the transport, in UTF-16 code units
    pub max_message_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: crate::pipeline::DEFAULT_WORKERS,
            max_message_len: 4000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`.
    ///
    /// A missing default file is created with commented defaults. An
    /// explicitly requested file must exist. Missing fields use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Overlay credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(TELEGRAM_TOKEN_ENV) {
            self.telegram.token = Some(token);
        }
        if let Some(token) = non_empty(GENIUS_TOKEN_ENV) {
            self.genius.token = Some(token);
        }
    }

    /// Get the default config file path: `~/.config/lyricsbot/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("lyricsbot").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# lyricsbot configuration
#
# Tokens may also come from the environment (or a .env file):
#   TELEGRAM_TOKEN, GENIUS_TOKEN
# Environment values win over this file.

[telegram]
# token = "123456:ABC..."
api_url = "https://api.telegram.org"
poll_timeout_secs = 30

[lyrics_ovh]
base_url = "https://api.lyrics.ovh/v1"
timeout_secs = 5

[genius]
# Fallback search is skipped entirely without a token.
# token = "..."
api_url = "https://api.genius.com"
timeout_secs = 10
excluded_terms = ["(Remix)", "(Live)"]
skip_non_songs = true

[pipeline]
# Background lookups allowed to run at the same time
max_concurrent_fetches = 10
# Longest message sent in one piece (UTF-16 code units, as Telegram counts)
max_message_len = 4000

[storage]
# Defaults to <data dir>/lyricsbot/favorites.db
# db_path = "/var/lib/lyricsbot/favorites.db"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.telegram.token, None);
        assert_eq!(config.lyrics_ovh.timeout_secs, 5);
        assert_eq!(config.genius.timeout_secs, 10);
        assert_eq!(config.genius.excluded_terms, vec!["(Remix)", "(Live)"]);
        assert_eq!(config.pipeline.max_message_len, 4000);
        assert_eq!(config.storage.db_path, None);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[genius]
token = "abc"

[pipeline]
max_concurrent_fetches = 2
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.genius.token.as_deref(), Some("abc"));
        assert_eq!(config.genius.api_url, "https://api.genius.com");
        assert_eq!(config.pipeline.max_concurrent_fetches, 2);
        assert_eq!(config.pipeline.max_message_len, 4000);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.lyrics_ovh.base_url, "https://api.lyrics.ovh/v1");
        assert!(config.genius.skip_non_songs);
    }

    #[test]
    fn test_env_overrides_tokens() {
        let mut config: Config = toml::from_str("[telegram]\ntoken = \"from-file\"").unwrap();
        let env: HashMap<&str, &str> =
            HashMap::from([(TELEGRAM_TOKEN_ENV, "from-env"), (GENIUS_TOKEN_ENV, "")]);

        config.apply_env_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.telegram.token.as_deref(), Some("from-env"));
        assert_eq!(config.genius.token, None);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\ndb_path = \"/tmp/fav.db\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.storage.db_path, Some(PathBuf::from("/tmp/fav.db")));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[pipeline\nmax_message_len = ").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
