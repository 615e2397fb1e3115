//! Leaderboard configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder values shipped in sample configs; treated as unset.
pub const PLACEHOLDER_URL: &str = "YOUR_SUPABASE_URL";
pub const PLACEHOLDER_KEY: &str = "YOUR_SUPABASE_ANON_KEY";

pub const DEFAULT_TABLE: &str = "scores";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Which store a configuration selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Rest {
        url: String,
        key: String,
        table: String,
    },
    File {
        path: PathBuf,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    pub disabled: bool,
    pub url: Option<String>,
    pub key: Option<String>,
    pub table: String,
    pub file: Option<PathBuf>,
    pub timeout: Duration,
    /// Use the in-memory store regardless of the other settings
    pub offline: bool,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            url: None,
            key: None,
            table: DEFAULT_TABLE.to_string(),
            file: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            offline: false,
        }
    }
}

impl LeaderboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .and_then(|s| if s.is_empty() { None } else { Some(s) })
        };

        let disabled = value("TETRIS_LEADERBOARD_DISABLED")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let url = value("TETRIS_LEADERBOARD_URL").filter(|v| v != PLACEHOLDER_URL);
        let key = value("TETRIS_LEADERBOARD_KEY").filter(|v| v != PLACEHOLDER_KEY);
        let table = value("TETRIS_LEADERBOARD_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let file = value("TETRIS_LEADERBOARD_FILE").map(PathBuf::from);
        let timeout_ms = value("TETRIS_LEADERBOARD_TIMEOUT_MS")
            .and_then(|s| s.parse().ok())
            .filter(|&ms: &u64| ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            disabled,
            url,
            key,
            table,
            file,
            timeout: Duration::from_millis(timeout_ms),
            offline: false,
        }
    }

    /// Pick the store, or explain why the leaderboard is unavailable.
    pub fn resolve(&self) -> Result<StoreConfig, String> {
        if self.disabled {
            return Err("disabled by TETRIS_LEADERBOARD_DISABLED".to_string());
        }
        if self.offline {
            return Ok(StoreConfig::Memory);
        }

        match (&self.url, &self.key) {
            (Some(url), Some(key)) => {
                return Ok(StoreConfig::Rest {
                    url: url.clone(),
                    key: key.clone(),
                    table: self.table.clone(),
                })
            }
            (Some(_), None) => return Err("TETRIS_LEADERBOARD_KEY is not set".to_string()),
            (None, Some(_)) if self.file.is_none() => {
                return Err("TETRIS_LEADERBOARD_URL is not set".to_string())
            }
            _ => {}
        }

        match &self.file {
            Some(path) => Ok(StoreConfig::File { path: path.clone() }),
            None => Err(
                "not configured (set TETRIS_LEADERBOARD_URL and TETRIS_LEADERBOARD_KEY, or TETRIS_LEADERBOARD_FILE)"
                    .to_string(),
            ),
        }
    }
}
