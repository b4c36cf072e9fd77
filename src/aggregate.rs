//! Subject and batch aggregation. Pure functions; every call rebuilds its result.
//!
//! Subject: w_i = reliability(source_i) · confidence_i
//!   score      = Σ(score_i · w_i) / Σ w_i
//!   confidence = min(0.9, Σ w_i / n)
//!
//! Batch (subjects with items only): w_j = item_count_j · confidence_j
//!   score      = Σ(score_j · w_j) / Σ w_j
//!   confidence = min(0.9, (Σ item_count_j / 50) · 0.5 + 0.3)

use crate::sentiment::{BatchSentiment, Distribution, ItemSentiment, Sentiment, SubjectSentiment};
use crate::source_weights::{weight, SourceKind};

pub const SUBJECT_CONFIDENCE_CAP: f32 = 0.9;
/// Confidence reported when every item carried zero weight.
pub const ZERO_WEIGHT_CONFIDENCE: f32 = 0.1;

pub const BATCH_CONFIDENCE_CAP: f32 = 0.9;
pub const BATCH_CONFIDENCE_BASE: f32 = 0.3;
pub const BATCH_CONFIDENCE_GAIN: f32 = 0.5;
/// Item volume at which the batch gain term reaches its full value.
pub const BATCH_SATURATION_ITEMS: f32 = 50.0;

/// Combine one subject's item sentiments, each paired with the source it came from.
pub fn aggregate_subject(subject_id: &str, items: &[(ItemSentiment, SourceKind)]) -> SubjectSentiment {
    if items.is_empty() {
        return SubjectSentiment::empty(subject_id);
    }

    let mut distribution = Distribution::default();
    let mut sources_used = std::collections::BTreeSet::new();
    let mut weighted = 0.0f32;
    let mut total_w = 0.0f32;

    for (item, source) in items {
        let w = weight(*source) * item.confidence;
        weighted += item.score * w;
        total_w += w;
        distribution.record(item.sentiment);
        sources_used.insert(*source);
    }

    let n = items.len() as f32;
    let (score, confidence) = if total_w > 0.0 {
        (weighted / total_w, (total_w / n).min(SUBJECT_CONFIDENCE_CAP))
    } else {
        (0.0, ZERO_WEIGHT_CONFIDENCE)
    };

    let score = crate::sentiment::clamp_score(score);
    SubjectSentiment {
        subject_id: subject_id.to_string(),
        item_count: items.len(),
        score,
        confidence: crate::sentiment::clamp01(confidence),
        sentiment: Sentiment::from_score(score),
        distribution,
        sources_used,
    }
}

/// Combine subject results into the overall verdict.
///
/// Subjects with no items are skipped for the score but still count toward `total_items`
/// (which adds zero). With no participating subject the verdict is neutral with zero confidence.
pub fn aggregate_batch(subjects: &[SubjectSentiment]) -> BatchSentiment {
    let total_items: usize = subjects.iter().map(|s| s.item_count).sum();

    let participating: Vec<&SubjectSentiment> =
        subjects.iter().filter(|s| s.item_count > 0).collect();
    if participating.is_empty() {
        return BatchSentiment::new(0.0, 0.0, 0, total_items);
    }

    let mut weighted = 0.0f32;
    let mut total_w = 0.0f32;
    let mut participating_items = 0usize;
    for s in &participating {
        let w = s.item_count as f32 * s.confidence;
        weighted += s.score * w;
        total_w += w;
        participating_items += s.item_count;
    }

    let score = if total_w > 0.0 { weighted / total_w } else { 0.0 };
    let confidence = ((participating_items as f32 / BATCH_SATURATION_ITEMS) * BATCH_CONFIDENCE_GAIN
        + BATCH_CONFIDENCE_BASE)
        .min(BATCH_CONFIDENCE_CAP);

    BatchSentiment::new(score, confidence, participating.len(), total_items)
}
