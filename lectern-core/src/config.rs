//! Configuration for lectern

use crate::cache::DEFAULT_VERSE_BUDGET;
use crate::LecternError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration as TOML
pub const DEFAULT_CONFIG: &str = r#"# Lectern Configuration

[api]
# Root of the passage endpoints (text/, html/, audio/, search/ are appended)
base_url = "https://api.esv.org/v3/passage"
# File holding the API token (LECTERN_API_KEY or --api-key take precedence)
key_file = "api-key.txt"
# Per-request timeout (e.g., "30s", "2m")
timeout = "30s"

[cache]
# JSON snapshot of cached chapters
path = "bibles/json_bibles/esv.json"
# Maximum verses kept across all cached chapters
verse_budget = 500
# Write the snapshot after every cached chapter
persist = true
"#;

/// Lectern configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    #[serde(default = "default_verse_budget")]
    pub verse_budget: usize,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.esv.org/v3/passage".to_string()
}
fn default_key_file() -> PathBuf {
    PathBuf::from("api-key.txt")
}
fn default_timeout() -> String {
    "30s".to_string()
}
fn default_cache_path() -> PathBuf {
    PathBuf::from("bibles/json_bibles/esv.json")
}
fn default_verse_budget() -> usize {
    DEFAULT_VERSE_BUDGET
}
fn default_persist() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key_file: default_key_file(),
            timeout: default_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            verse_budget: default_verse_budget(),
            persist: default_persist(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, otherwise defaults
    pub fn load_or_default(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| LecternError::ConfigParse(e.to_string()))
    }

    /// Get request timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        parse_duration(&self.api.timeout).unwrap_or(Duration::from_secs(30))
    }

    /// Resolve the API key: an explicit value wins, otherwise the trimmed
    /// contents of `api.key_file`.
    pub fn api_key(&self, explicit: Option<&str>) -> crate::Result<String> {
        let key = match explicit {
            Some(key) => key.trim().to_string(),
            None => std::fs::read_to_string(&self.api.key_file)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        };
        if key.is_empty() {
            return Err(LecternError::MissingApiKey(self.api.key_file.clone()));
        }
        Ok(key)
    }
}

/// Parse duration string (e.g., "30s", "5m", "1h")
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (unit_start, _) = s.char_indices().last()?;
    let (num_str, unit) = s.split_at(unit_start);
    let num: u64 = num_str.parse().ok()?;

    match unit {
        "s" => Some(Duration::from_secs(num)),
        "m" => Some(Duration::from_secs(num * 60)),
        "h" => Some(Duration::from_secs(num * 3600)),
        _ => None,
    }
}
