//! Keyword scorer: bullish/bearish vocabulary, case-insensitive substring presence.
//!
//! Each term counts once per text; terms in the strong lists count double.

use serde_json::json;

use super::scoring::MethodScorer;
use crate::sentiment::{MethodKind, MethodScore};

pub const STRONG_TERM_WEIGHT: f32 = 2.0;
pub const KEYWORD_BASE_CONFIDENCE: f32 = 0.3;
pub const KEYWORD_CONFIDENCE_STEP: f32 = 0.1;
pub const KEYWORD_CONFIDENCE_CAP: f32 = 0.9;

pub const POSITIVE_TERMS: &[&str] = &[
    "buy",
    "long",
    "green",
    "gains",
    "profit",
    "strong",
    "good",
    "great",
    "love",
    "rally",
    "pump",
    "calls",
    "upgrade",
    "beat",
    "outperform",
    "growth",
    "record high",
];

pub const STRONG_POSITIVE_TERMS: &[&str] = &[
    "bullish",
    "moon",
    "rocket",
    "breakout",
    "surge",
    "soar",
    "excellent",
];

pub const NEGATIVE_TERMS: &[&str] = &[
    "sell",
    "short",
    "in the red",
    "dump",
    "loss",
    "weak",
    "bad",
    "hate",
    "avoid",
    "breakdown",
    "fall",
    "drop",
    "puts",
    "decline",
    "correction",
    "downgrade",
    "missed",
    "underperform",
];

pub const STRONG_NEGATIVE_TERMS: &[&str] = &[
    "bearish",
    "crash",
    "plunge",
    "terrible",
    "collapse",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

/// Matched terms and their summed weight for one polarity.
fn matches<'a>(lower: &str, normal: &[&'a str], strong: &[&'a str]) -> (Vec<&'a str>, f32) {
    let mut hits = Vec::new();
    let mut weight = 0.0;
    for t in normal {
        if lower.contains(t) {
            hits.push(*t);
            weight += 1.0;
        }
    }
    for t in strong {
        if lower.contains(t) {
            hits.push(*t);
            weight += STRONG_TERM_WEIGHT;
        }
    }
    (hits, weight)
}

impl MethodScorer for KeywordScorer {
    fn kind(&self) -> MethodKind {
        MethodKind::Keyword
    }

    fn score(&self, text: &str) -> Option<MethodScore> {
        let lower = text.to_lowercase();
        let (pos_hits, pos) = matches(&lower, POSITIVE_TERMS, STRONG_POSITIVE_TERMS);
        let (neg_hits, neg) = matches(&lower, NEGATIVE_TERMS, STRONG_NEGATIVE_TERMS);

        let total = pos + neg;
        if total == 0.0 {
            return None;
        }

        let raw = (pos - neg) / total.max(1.0);
        let confidence = (KEYWORD_BASE_CONFIDENCE + KEYWORD_CONFIDENCE_STEP * total)
            .min(KEYWORD_CONFIDENCE_CAP);

        Some(
            MethodScore::new(MethodKind::Keyword, raw, confidence).with_evidence(json!({
                "positive": pos_hits,
                "negative": neg_hits,
                "positive_weight": pos,
                "negative_weight": neg,
            })),
        )
    }
}
