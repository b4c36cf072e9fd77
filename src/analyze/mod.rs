// src/analyze/mod.rs
//! Item scoring pipeline: normalize, run every registered method scorer, combine.

pub mod contextual;
pub mod keyword;
pub mod pattern;
pub mod scoring;

use serde::Serialize;

use crate::ingest::normalize_text;
use crate::sentiment::{ItemSentiment, MethodScore};

// Re-export convenient types.
pub use crate::analyze::contextual::ContextualScorer;
pub use crate::analyze::keyword::KeywordScorer;
pub use crate::analyze::pattern::PatternScorer;
pub use crate::analyze::scoring::{combine, MethodScorer};

/// Per-text breakdown returned by `/score` and used by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub normalized: String,
    pub methods: Vec<MethodScore>,
    /// `None` when no method had an opinion or the text was not scorable.
    pub item: Option<ItemSentiment>,
}

/// Ordered list of method scorers. Adding a method never touches aggregation.
pub struct ItemScorer {
    scorers: Vec<Box<dyn MethodScorer>>,
}

impl Default for ItemScorer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(KeywordScorer),
            Box::new(PatternScorer),
            Box::new(ContextualScorer),
        ])
    }
}

impl ItemScorer {
    pub fn new(scorers: Vec<Box<dyn MethodScorer>>) -> Self {
        Self { scorers }
    }

    /// Normalize raw text, then score it.
    pub fn score_text(&self, raw: &str) -> ScoreBreakdown {
        let normalized = normalize_text(raw);
        let mut out = self.score_normalized(&normalized);
        out.normalized = normalized;
        out
    }

    /// Score text that already went through [`normalize_text`].
    pub fn score_normalized(&self, text: &str) -> ScoreBreakdown {
        if text.is_empty() {
            return ScoreBreakdown {
                normalized: String::new(),
                methods: Vec::new(),
                item: None,
            };
        }
        let methods = self.run(text);
        let item = combine(&methods);
        ScoreBreakdown {
            normalized: text.to_string(),
            methods,
            item,
        }
    }

    /// Item-level sentiment only.
    pub fn score_item(&self, normalized: &str) -> Option<ItemSentiment> {
        if normalized.is_empty() {
            return None;
        }
        combine(&self.run(normalized))
    }

    fn run(&self, text: &str) -> Vec<MethodScore> {
        self.scorers.iter().filter_map(|s| s.score(text)).collect()
    }
}
