//! Method scorer capability and the item combiner.
//!
//! Every heuristic implements [`MethodScorer`] and returns `None` when it finds
//! no signal. [`combine`] folds whatever came back into one [`ItemSentiment`]:
//!
//! score      = Σ(score_i · conf_i) / Σ conf_i   (unweighted mean if Σ conf_i == 0)
//! confidence = min(0.95, Σ conf_i / n)
//!
//! The label is re-derived from the combined score; method labels never leak upward.

use crate::sentiment::{ItemSentiment, MethodKind, MethodScore};

/// Upper bound on item-level confidence.
pub const ITEM_CONFIDENCE_CAP: f32 = 0.95;

/// One independent sentiment heuristic over normalized text.
pub trait MethodScorer: Send + Sync {
    fn kind(&self) -> MethodKind;

    /// `None` means "no opinion", not "neutral".
    fn score(&self, text: &str) -> Option<MethodScore>;
}

/// Confidence-weighted mean of method scores. Empty input yields `None`.
pub fn combine(scores: &[MethodScore]) -> Option<ItemSentiment> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f32;
    let conf_sum: f32 = scores.iter().map(|s| s.confidence).sum();

    let score = if conf_sum > 0.0 {
        scores.iter().map(|s| s.score * s.confidence).sum::<f32>() / conf_sum
    } else {
        scores.iter().map(|s| s.score).sum::<f32>() / n
    };
    let confidence = (conf_sum / n).min(ITEM_CONFIDENCE_CAP);

    Some(ItemSentiment::new(score, confidence, scores.len()))
}
