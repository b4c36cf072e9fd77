//! Contextual scorer: price mentions, signed percentage moves, target talk,
//! urgency and hedging words.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::scoring::MethodScorer;
use crate::sentiment::{MethodKind, MethodScore};

pub const CONTEXT_BASE_CONFIDENCE: f32 = 0.3;
pub const CONTEXT_CONFIDENCE_SHIFT: f32 = 0.1;
pub const CONTEXT_CONFIDENCE_MIN: f32 = 0.1;
pub const CONTEXT_CONFIDENCE_MAX: f32 = 0.9;

pub const PRICE_MENTION_BIAS: f32 = 0.05;
pub const PRICE_MENTION_CAP: f32 = 0.15;
/// Score per percentage point of an explicitly signed move.
pub const PERCENT_SCALE: f32 = 0.02;
pub const PERCENT_CAP: f32 = 0.3;
pub const TARGET_BIAS: f32 = 0.1;
pub const URGENCY_BIAS: f32 = 0.05;
pub const UNCERTAINTY_PENALTY: f32 = -0.1;

const TARGET_PHRASES: &[&str] = &[
    "price target",
    "target price",
    "upside target",
    "raises target",
    "target raised",
];
const URGENCY_WORDS: &[&str] = &["now", "today", "asap"];
const UNCERTAINTY_WORDS: &[&str] = &["maybe", "might", "unsure", "uncertain", "perhaps"];
/// Endings a cue word may carry and still count ("uncertainty", "uncertainly").
const CUE_SUFFIXES: &[&str] = &["s", "ly", "ty", "ties"];

static RE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d+(?:[.,]\d+)*").expect("price regex"));
static RE_SIGNED_PCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s(])(?P<sign>[+-])(?P<num>\d+(?:\.\d+)?)\s?%").expect("pct regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextualScorer;

fn is_cue(token: &str, words: &[&str]) -> bool {
    words.iter().any(|w| match token.strip_prefix(w) {
        Some("") => true,
        Some(rest) => CUE_SUFFIXES.contains(&rest),
        None => false,
    })
}

impl MethodScorer for ContextualScorer {
    fn kind(&self) -> MethodKind {
        MethodKind::Contextual
    }

    fn score(&self, text: &str) -> Option<MethodScore> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let prices = RE_PRICE.find_iter(text).count();

        let mut pct_moves: Vec<f32> = Vec::new();
        for caps in RE_SIGNED_PCT.captures_iter(text) {
            let Some(value) = caps.name("num").and_then(|m| m.as_str().parse::<f32>().ok())
            else {
                continue;
            };
            let sign = if &caps["sign"] == "-" { -1.0 } else { 1.0 };
            pct_moves.push(sign * value);
        }

        let has_target = TARGET_PHRASES.iter().any(|p| lower.contains(p));
        let urgent = tokens.iter().filter(|t| is_cue(t, URGENCY_WORDS)).count();
        let hedged = tokens.iter().filter(|t| is_cue(t, UNCERTAINTY_WORDS)).count();

        if prices == 0 && pct_moves.is_empty() && !has_target && urgent == 0 && hedged == 0 {
            return None;
        }

        let mut score = (PRICE_MENTION_BIAS * prices as f32).min(PRICE_MENTION_CAP);
        for pct in &pct_moves {
            score += (pct * PERCENT_SCALE).clamp(-PERCENT_CAP, PERCENT_CAP);
        }
        if has_target {
            score += TARGET_BIAS;
        }
        score += URGENCY_BIAS * urgent as f32;
        score += UNCERTAINTY_PENALTY * hedged as f32;

        let mut confidence = CONTEXT_BASE_CONFIDENCE;
        if urgent > 0 {
            confidence += CONTEXT_CONFIDENCE_SHIFT;
        }
        if hedged > 0 {
            confidence -= CONTEXT_CONFIDENCE_SHIFT;
        }
        let confidence = confidence.clamp(CONTEXT_CONFIDENCE_MIN, CONTEXT_CONFIDENCE_MAX);

        Some(
            MethodScore::new(MethodKind::Contextual, score, confidence).with_evidence(json!({
                "price_mentions": prices,
                "percent_moves": pct_moves,
                "target": has_target,
                "urgency": urgent,
                "uncertainty": hedged,
            })),
        )
    }
}
