//! Pattern scorer: surface cues only (punctuation, shouting, emoji).
//!
//! Structural cues are weaker evidence than vocabulary, so confidence is fixed.

use serde_json::json;

use super::scoring::MethodScorer;
use crate::sentiment::{MethodKind, MethodScore};

pub const PATTERN_CONFIDENCE: f32 = 0.4;
/// Per `!` when the text also carries a positive word.
pub const EXCLAIM_POSITIVE: f32 = 0.2;
/// Per `!` otherwise.
pub const EXCLAIM_GENERIC: f32 = 0.05;
/// Per `?`.
pub const QUESTION_PENALTY: f32 = -0.1;
/// Per ALL-CAPS token that is a polarity word.
pub const CAPS_WEIGHT: f32 = 0.3;

/// Matched as whole lowercase words.
const POSITIVE_WORDS: &[&str] = &[
    "bull", "bulls", "bullish", "moon", "mooning", "moonshot", "buy", "buys", "buying", "gain",
    "gains", "gained", "up", "rocket", "rockets", "rocketing", "win", "wins", "winning", "winner",
    "great", "rally", "rallies", "rallying", "surge", "surges", "surged", "surging", "pump",
    "pumping", "long", "longs", "green", "beat", "beats",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bear", "bears", "bearish", "sell", "sells", "selling", "selloff", "crash", "crashes",
    "crashed", "crashing", "dump", "dumps", "dumping", "dumped", "loss", "losses", "down", "drop",
    "drops", "dropped", "dropping", "short", "shorts", "shorting", "fall", "falls", "falling",
    "red", "weak", "weaker", "weakness", "miss", "missed", "misses",
];

/// Per-occurrence emoji contributions.
pub const EMOJI_SCORES: &[(char, f32)] = &[
    ('🚀', 0.5),
    ('📈', 0.4),
    ('🐂', 0.4),
    ('💎', 0.3),
    ('💪', 0.3),
    ('🔥', 0.3),
    ('🌙', 0.3),
    ('🎯', 0.2),
    ('✅', 0.2),
    ('📉', -0.4),
    ('🐻', -0.4),
    ('🩸', -0.4),
    ('😱', -0.4),
    ('💀', -0.5),
    ('⚠', -0.3),
    ('😭', -0.3),
    ('🔻', -0.3),
    ('🤔', -0.1),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternScorer;

fn polarity(word_lower: &str) -> i8 {
    if POSITIVE_WORDS.contains(&word_lower) {
        1
    } else if NEGATIVE_WORDS.contains(&word_lower) {
        -1
    } else {
        0
    }
}

fn is_shouting(token: &str) -> bool {
    let letters: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

impl MethodScorer for PatternScorer {
    fn kind(&self) -> MethodKind {
        MethodKind::Pattern
    }

    fn score(&self, text: &str) -> Option<MethodScore> {
        if text.trim().is_empty() {
            return None;
        }

        let words: Vec<&str> = text
            .split(|c: char| !(c.is_alphanumeric() || c == '$'))
            .filter(|w| !w.is_empty())
            .collect();
        let has_positive_word = words.iter().any(|w| polarity(&w.to_lowercase()) > 0);

        let exclaims = text.matches('!').count();
        let questions = text.matches('?').count();

        let mut score = 0.0f32;
        let per_exclaim = if has_positive_word {
            EXCLAIM_POSITIVE
        } else {
            EXCLAIM_GENERIC
        };
        score += per_exclaim * exclaims as f32;
        score += QUESTION_PENALTY * questions as f32;

        // $TICKERS are uppercase by convention, not shouting.
        let mut caps_hits: Vec<&str> = Vec::new();
        for w in words.iter().filter(|w| !w.starts_with('$') && is_shouting(w)) {
            let p = polarity(&w.to_lowercase());
            if p != 0 {
                score += CAPS_WEIGHT * p as f32;
                caps_hits.push(*w);
            }
        }

        let mut emoji_hits = 0usize;
        for c in text.chars() {
            if let Some((_, v)) = EMOJI_SCORES.iter().find(|(e, _)| *e == c) {
                score += v;
                emoji_hits += 1;
            }
        }

        Some(
            MethodScore::new(MethodKind::Pattern, score, PATTERN_CONFIDENCE).with_evidence(
                json!({
                    "exclamations": exclaims,
                    "questions": questions,
                    "caps": caps_hits,
                    "emoji": emoji_hits,
                }),
            ),
        )
    }
}
