// src/ingest/config.rs
//! Watchlist loading: which subjects to analyze and which symbols to filter on.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::symbols::{clean_subject, clean_symbols};

const ENV_PATH: &str = "SENTIMENT_WATCHLIST_PATH";

/// Subjects plus an optional symbol filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Watchlist {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl Watchlist {
    /// Built-in list of commentators and large-cap symbols.
    pub fn default_seed() -> Self {
        let subjects = [
            "elonmusk",
            "chamath",
            "cathiedwood",
            "jimcramer",
            "garyblack00",
            "reformedbroker",
            "unusual_whales",
            "zerohedge",
        ];
        let symbols = [
            "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "META", "NFLX", "AMD", "CRM",
        ];
        Self {
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Load a watchlist from an explicit path. Supports TOML or JSON formats.
pub fn load_watchlist_from(path: &Path) -> Result<Watchlist> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading watchlist from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_watchlist(&content, ext.as_str())
}

/// Load a watchlist using env var + fallbacks:
/// 1) $SENTIMENT_WATCHLIST_PATH
/// 2) config/watchlist.toml
/// 3) config/watchlist.json
/// 4) empty watchlist
pub fn load_watchlist_default() -> Result<Watchlist> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_watchlist_from(&pb);
        } else {
            return Err(anyhow!("SENTIMENT_WATCHLIST_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/watchlist.toml");
    if toml_p.exists() {
        return load_watchlist_from(&toml_p);
    }
    let json_p = PathBuf::from("config/watchlist.json");
    if json_p.exists() {
        return load_watchlist_from(&json_p);
    }
    Ok(Watchlist::default())
}

fn parse_watchlist(s: &str, hint_ext: &str) -> Result<Watchlist> {
    let try_toml = hint_ext == "toml" || (hint_ext != "json" && s.contains("subjects ="));
    if try_toml {
        if let Ok(v) = toml::from_str::<Watchlist>(s) {
            return Ok(clean(v));
        }
    }
    if let Ok(v) = serde_json::from_str::<Watchlist>(s) {
        return Ok(clean(v));
    }
    if !try_toml {
        if let Ok(v) = toml::from_str::<Watchlist>(s) {
            return Ok(clean(v));
        }
    }
    Err(anyhow!("unsupported watchlist format"))
}

fn clean(w: Watchlist) -> Watchlist {
    let mut subjects: Vec<String> = Vec::new();
    for s in w.subjects {
        let c = clean_subject(&s);
        if !c.is_empty() && !subjects.contains(&c) {
            subjects.push(c);
        }
    }
    Watchlist {
        subjects,
        symbols: clean_symbols(&w.symbols),
    }
}
