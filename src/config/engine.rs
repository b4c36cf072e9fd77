// src/config/engine.rs
//! Engine configuration (TOML).
//!
//! Path resolution: `$ENGINE_CONFIG_PATH` → `config/engine.toml` → built-in defaults.
//! `SENTIMENT_RECENT_TTL_SECS` / `SENTIMENT_HISTORICAL_TTL_SECS` override the cache TTLs;
//! values that do not parse as a positive integer are ignored.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::ingest::types::FetchIntent;
use crate::source_weights::SourceKind;

pub const ENV_ENGINE_CONFIG_PATH: &str = "ENGINE_CONFIG_PATH";
pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_RECENT_TTL: &str = "SENTIMENT_RECENT_TTL_SECS";
pub const ENV_HISTORICAL_TTL: &str = "SENTIMENT_HISTORICAL_TTL_SECS";
pub const ENV_NEWS_API_KEY: &str = "BRAVE_SEARCH_API_KEY";

/// Two hours: reference freshness for "recent sentiment".
pub const DEFAULT_RECENT_TTL_SECS: u64 = 2 * 3600;
pub const DEFAULT_HISTORICAL_TTL_SECS: u64 = 24 * 3600;
pub const DEFAULT_MAX_ITEMS_PER_SUBJECT: usize = 20;
pub const DEFAULT_NEAR_DUPLICATE_THRESHOLD: f32 = 0.90;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub ingest: IngestConfig,
    pub news_search: NewsSearchConfig,
    pub rss: RssConfig,
    pub synthetic: SyntheticConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub recent_ttl_secs: u64,
    pub historical_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            recent_ttl_secs: DEFAULT_RECENT_TTL_SECS,
            historical_ttl_secs: DEFAULT_HISTORICAL_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_items_per_subject: usize,
    /// Normalized Levenshtein similarity at or above which two texts count as one.
    pub near_duplicate_threshold: f32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_items_per_subject: DEFAULT_MAX_ITEMS_PER_SUBJECT,
            near_duplicate_threshold: DEFAULT_NEAR_DUPLICATE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSearchConfig {
    pub enabled: bool,
    pub base_url: String,
    /// "ENV" means: read from BRAVE_SEARCH_API_KEY
    pub api_key: String,
    pub rate_limit_ms: u64,
    pub max_queries: usize,
    pub results_per_query: usize,
}

impl Default for NewsSearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.search.brave.com/res/v1".to_string(),
            api_key: "ENV".to_string(),
            rate_limit_ms: 2000,
            max_queries: 3,
            results_per_query: 5,
        }
    }
}

impl NewsSearchConfig {
    /// Resolved key, or `None` when unset. A missing key is not an error here.
    pub fn resolved_api_key(&self) -> Option<String> {
        let raw = self.api_key.trim();
        let key = if raw.eq_ignore_ascii_case("env") {
            env::var(ENV_NEWS_API_KEY).ok()?
        } else {
            raw.to_string()
        };
        let key = key.trim().to_string();
        (!key.is_empty()).then_some(key)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RssConfig {
    pub feeds: Vec<RssFeed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssFeed {
    pub url: String,
    #[serde(default = "default_feed_kind")]
    pub kind: SourceKind,
}

fn default_feed_kind() -> SourceKind {
    SourceKind::GeneralRSS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub enabled: bool,
    pub max_items: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: 10,
        }
    }
}

impl EngineConfig {
    /// Resolve the config file, parse it and apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(ENV_ENGINE_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_ENGINE_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::load_from_file(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_ENGINE_CONFIG_PATH);
                if path.exists() {
                    Self::load_from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing engine config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: EngineConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(secs) = parse_secs_env(env::var(ENV_RECENT_TTL).ok()) {
            self.cache.recent_ttl_secs = secs;
        }
        if let Some(secs) = parse_secs_env(env::var(ENV_HISTORICAL_TTL).ok()) {
            self.cache.historical_ttl_secs = secs;
        }
    }

    /// Cache validity window for a fetch intent.
    pub fn ttl_for(&self, intent: FetchIntent) -> Duration {
        match intent {
            FetchIntent::Recent => Duration::from_secs(self.cache.recent_ttl_secs),
            FetchIntent::Historical => Duration::from_secs(self.cache.historical_ttl_secs),
        }
    }

    fn sanitize(&mut self) {
        let t = self.ingest.near_duplicate_threshold;
        if !t.is_finite() || t <= 0.0 {
            self.ingest.near_duplicate_threshold = DEFAULT_NEAR_DUPLICATE_THRESHOLD;
        }
        if self.ingest.max_items_per_subject == 0 {
            self.ingest.max_items_per_subject = DEFAULT_MAX_ITEMS_PER_SUBJECT;
        }
        self.news_search.max_queries = self.news_search.max_queries.max(1);
        self.news_search.results_per_query = self.news_search.results_per_query.max(1);
    }
}

fn parse_secs_env(raw: Option<String>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|v| *v > 0)
}
