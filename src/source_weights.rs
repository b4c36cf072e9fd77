//! # Source Weights
//!
//! Fixed mapping from the kind of source a content item came from to a
//! trust/reliability weight in `[0.0, 1.0]`.
//!
//! - Closed set of source kinds; curated news ranks above ad-hoc social search.
//! - Case-insensitive label parsing with normalization of punctuation, dashes, etc.
//! - Aliases map provider names ("brave_news", "rss", "mock_data") to kinds.
//! - Anything unrecognized resolves to [`SourceKind::Unknown`], never to an error.
//!
//! The table is deliberately static: no learning, no decay.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const WEIGHT_NEWS_WIRE: f32 = 1.0;
pub const WEIGHT_FINANCIAL_NEWS_FEED: f32 = 0.9;
pub const WEIGHT_GENERAL_RSS: f32 = 0.8;
pub const WEIGHT_SOCIAL_SEARCH: f32 = 0.7;
pub const WEIGHT_SYNTHETIC_MARKET_CONTEXT: f32 = 0.6;
pub const WEIGHT_UNKNOWN: f32 = 0.5;

/// Where a content item originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    NewsWire,
    FinancialNewsFeed,
    #[serde(rename = "general_rss")]
    GeneralRSS,
    SocialSearch,
    SyntheticMarketContext,
    Unknown,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        SourceKind::NewsWire,
        SourceKind::FinancialNewsFeed,
        SourceKind::GeneralRSS,
        SourceKind::SocialSearch,
        SourceKind::SyntheticMarketContext,
        SourceKind::Unknown,
    ];

    /// Reliability weight for this source kind.
    pub fn weight(self) -> f32 {
        match self {
            SourceKind::NewsWire => WEIGHT_NEWS_WIRE,
            SourceKind::FinancialNewsFeed => WEIGHT_FINANCIAL_NEWS_FEED,
            SourceKind::GeneralRSS => WEIGHT_GENERAL_RSS,
            SourceKind::SocialSearch => WEIGHT_SOCIAL_SEARCH,
            SourceKind::SyntheticMarketContext => WEIGHT_SYNTHETIC_MARKET_CONTEXT,
            SourceKind::Unknown => WEIGHT_UNKNOWN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::NewsWire => "news_wire",
            SourceKind::FinancialNewsFeed => "financial_news_feed",
            SourceKind::GeneralRSS => "general_rss",
            SourceKind::SocialSearch => "social_search",
            SourceKind::SyntheticMarketContext => "synthetic_market_context",
            SourceKind::Unknown => "unknown",
        }
    }

    /// Resolve a free-form label to a kind.
    ///
    /// Steps:
    /// 1. Normalize (lowercase, separators → spaces, collapse whitespace).
    /// 2. Canonical name match.
    /// 3. Alias match.
    /// 4. `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let s = normalize(label);

        for kind in Self::ALL {
            if normalize(kind.as_str()) == s {
                return kind;
            }
        }

        for (alias, kind) in ALIASES {
            if *alias == s {
                return *kind;
            }
        }

        SourceKind::Unknown
    }
}

/// Free function form of [`SourceKind::weight`].
pub fn weight(source: SourceKind) -> f32 {
    source.weight()
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceKind {
    // Lenient: unknown labels become `Unknown` instead of failing the whole document.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(SourceKind::from_label(&raw))
    }
}

/// Normalized alias → kind.
const ALIASES: &[(&str, SourceKind)] = &[
    ("newswire", SourceKind::NewsWire),
    ("news", SourceKind::NewsWire),
    ("brave news", SourceKind::NewsWire),
    ("reuters", SourceKind::NewsWire),
    ("financial news", SourceKind::FinancialNewsFeed),
    ("financial feed", SourceKind::FinancialNewsFeed),
    ("finance feed", SourceKind::FinancialNewsFeed),
    ("rss", SourceKind::GeneralRSS),
    ("general rss", SourceKind::GeneralRSS),
    ("feed", SourceKind::GeneralRSS),
    ("social", SourceKind::SocialSearch),
    ("brave web", SourceKind::SocialSearch),
    ("web", SourceKind::SocialSearch),
    ("twitter api", SourceKind::SocialSearch),
    ("scrape", SourceKind::SocialSearch),
    ("synthetic", SourceKind::SyntheticMarketContext),
    ("mock data", SourceKind::SyntheticMarketContext),
    ("market context", SourceKind::SyntheticMarketContext),
];

/// Normalize input string: lowercase, replace punctuation/dashes with spaces,
/// collapse multiple spaces into one.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();

    // Replace common separators with spaces.
    for ch in ['—', '–', '-', '_', '/', '\\'] {
        out = out.replace(ch, " ");
    }

    // Replace disruptive punctuation/whitespace with spaces.
    out = out.replace(['\n', '\r', '\t', '.', ',', '’', '\''], " ");

    // Collapse multiple spaces.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
