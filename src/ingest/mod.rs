// src/ingest/mod.rs
pub mod cache;
pub mod config;
pub mod providers;
pub mod symbols;
pub mod types;

use crate::ingest::types::ContentItem;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Normalized text longer than this is truncated.
pub const MAX_TEXT_CHARS: usize = 1500;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sentiment_items_scored_total",
            "Content items that produced an item-level sentiment."
        );
        describe_counter!(
            "sentiment_items_dropped_total",
            "Content items dropped before scoring (empty after normalization or near-duplicate)."
        );
        describe_counter!("sentiment_cache_hits_total", "Freshness cache hits.");
        describe_counter!("sentiment_cache_misses_total", "Freshness cache misses.");
        describe_counter!(
            "sentiment_supplier_errors_total",
            "Content supplier fetch/parse errors."
        );
        describe_counter!(
            "sentiment_subjects_failed_total",
            "Subjects excluded from the overall verdict."
        );
        describe_histogram!("sentiment_fetch_ms", "Supplier fetch time in milliseconds.");
        describe_gauge!(
            "sentiment_cache_ttl_secs",
            "Configured TTL for recent-sentiment content."
        );
    });
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("url regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Normalize raw text before scoring.
///
/// Never fails. An empty result means "not scorable"; callers drop the item.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    out = RE_TAGS.replace_all(&out, " ").to_string();

    // 3) Remove URL-like substrings
    out = RE_URL.replace_all(&out, " ").to_string();

    // 4) Normalize “ ” ‘ ’ to ASCII, then keep only allow-listed characters
    out = out
        .replace(['\u{2018}', '\u{2019}'], "'")
        .chars()
        .map(|c| if is_allowed(c) { c } else { ' ' })
        .collect();

    // 5) Collapse whitespace
    out = RE_WS.replace_all(&out, " ").trim().to_string();

    // 6) Length cap
    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect::<String>().trim_end().to_string();
    }

    out
}

fn is_allowed(c: char) -> bool {
    if c.is_control() {
        return false;
    }
    c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '$' | '!' | '?' | '.' | ',' | '-' | '#' | '@' | '%' | '+' | '\'')
        || is_pictograph(c)
}

/// Emoji blocks the pattern scorer reads.
fn is_pictograph(c: char) -> bool {
    matches!(c as u32, 0x1F300..=0x1FAFF | 0x2600..=0x27BF)
}

/// Short, stable fingerprint of a text for logs (raw text is never logged).
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Items that survived preparation, plus what was dropped.
#[derive(Debug, Clone, Default)]
pub struct Prepared {
    pub items: Vec<ContentItem>,
    pub dropped_empty: usize,
    pub dropped_duplicate: usize,
}

/// Normalize every item's text, drop the unscorable ones, collapse near-duplicates
/// (normalized Levenshtein similarity >= `near_dup_threshold`) and cap the count.
pub fn prepare_items(
    raw: Vec<ContentItem>,
    near_dup_threshold: f32,
    max_items: usize,
) -> Prepared {
    ensure_metrics_described();

    let mut out = Prepared::default();
    let mut seen: Vec<String> = Vec::new();

    for mut item in raw {
        let text = normalize_text(&item.text);
        if text.is_empty() {
            out.dropped_empty += 1;
            continue;
        }
        let lowered = text.to_lowercase();
        if is_near_duplicate(&lowered, &seen, near_dup_threshold) {
            tracing::debug!(target: "ingest", id = %fingerprint(&text), "near-duplicate dropped");
            out.dropped_duplicate += 1;
            continue;
        }
        if out.items.len() >= max_items {
            break;
        }
        seen.push(lowered);
        item.text = text;
        out.items.push(item);
    }

    let dropped = (out.dropped_empty + out.dropped_duplicate) as u64;
    if dropped > 0 {
        counter!("sentiment_items_dropped_total").increment(dropped);
    }
    out
}

fn is_near_duplicate(text: &str, seen: &[String], threshold: f32) -> bool {
    if threshold > 1.0 {
        return false;
    }
    seen.iter()
        .any(|s| strsim::normalized_levenshtein(text, s) as f32 >= threshold)
}
