//! # Sentiment model
//! Typed scores produced at every level of the pipeline: per method, per item,
//! per subject and per batch.
//!
//! The label (`positive` / `negative` / `neutral`) is never stored on its own.
//! Every constructor derives it from the score through [`Sentiment::from_score`],
//! so the same cutoff applies at every aggregation level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::source_weights::SourceKind;

/// Scores strictly above this are positive, strictly below its negation negative.
pub const LABEL_THRESHOLD: f32 = 0.1;

/// Sentiment label derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// The single labeling rule of the whole system.
    pub fn from_score(score: f32) -> Self {
        if score > LABEL_THRESHOLD {
            Sentiment::Positive
        } else if score < -LABEL_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Which heuristic produced a [`MethodScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Keyword,
    Pattern,
    Contextual,
}

/// Provisional score from one method for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodScore {
    pub method: MethodKind,
    pub sentiment: Sentiment,
    /// In `[-1, 1]`.
    pub score: f32,
    /// In `[0, 1]`.
    pub confidence: f32,
    /// Method-specific detail (matched terms, cue counts, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
}

impl MethodScore {
    /// Clamps inputs into range and derives the label.
    pub fn new(method: MethodKind, score: f32, confidence: f32) -> Self {
        let score = clamp_score(score);
        Self {
            method,
            sentiment: Sentiment::from_score(score),
            score,
            confidence: clamp01(confidence),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

/// Combined result for one content item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSentiment {
    pub score: f32,
    pub confidence: f32,
    pub sentiment: Sentiment,
    pub contributing_methods: usize,
}

impl ItemSentiment {
    pub fn new(score: f32, confidence: f32, contributing_methods: usize) -> Self {
        let score = clamp_score(score);
        Self {
            score,
            confidence: clamp01(confidence),
            sentiment: Sentiment::from_score(score),
            contributing_methods,
        }
    }
}

/// Plain per-label item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl Distribution {
    pub fn record(&mut self, s: Sentiment) {
        match s {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Aggregate for one subject. Rebuilt from scratch on every aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSentiment {
    pub subject_id: String,
    pub item_count: usize,
    pub score: f32,
    pub confidence: f32,
    pub sentiment: Sentiment,
    pub distribution: Distribution,
    pub sources_used: BTreeSet<SourceKind>,
}

impl SubjectSentiment {
    /// Terminal state for a subject with no items: zero score, zero confidence.
    pub fn empty(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            item_count: 0,
            score: 0.0,
            confidence: 0.0,
            sentiment: Sentiment::Neutral,
            distribution: Distribution::default(),
            sources_used: BTreeSet::new(),
        }
    }
}

/// Overall verdict across subjects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSentiment {
    pub score: f32,
    pub confidence: f32,
    pub sentiment: Sentiment,
    pub subjects_analyzed: usize,
    pub total_items: usize,
}

impl BatchSentiment {
    pub fn new(score: f32, confidence: f32, subjects_analyzed: usize, total_items: usize) -> Self {
        let score = clamp_score(score);
        Self {
            score,
            confidence: clamp01(confidence),
            sentiment: Sentiment::from_score(score),
            subjects_analyzed,
            total_items,
        }
    }
}

/// Clamp to `[-1.0, 1.0]`; NaN collapses to 0.
pub fn clamp_score(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0)
    }
}

/// Clamp to `[0.0, 1.0]`; NaN collapses to 0.
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
