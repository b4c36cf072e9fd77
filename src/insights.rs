//! # Insights
//! Read-only interpretation of an [`AnalysisReport`]: strength, consensus,
//! alignment, outliers, themes and a coarse market assessment.
//!
//! Pure function of the report; no I/O and no clock.

use serde::{Deserialize, Serialize};

use crate::engine::AnalysisReport;
use crate::sentiment::{Sentiment, SubjectSentiment};

pub const STRONG_SCORE: f32 = 0.6;
pub const MODERATE_SCORE: f32 = 0.3;
pub const HIGH_CONSENSUS: f32 = 0.8;
pub const MODERATE_CONSENSUS: f32 = 0.6;
/// Minimum deviation from the mean subject score to count as an outlier.
pub const OUTLIER_DEVIATION: f32 = 0.5;
pub const HIGH_ENGAGEMENT_ITEMS: usize = 50;
pub const LOW_ENGAGEMENT_ITEMS: usize = 20;
pub const MOOD_THRESHOLD: f32 = 0.3;
pub const IMPLICATION_THRESHOLD: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

/// Shared scale for consensus, impact, risk and catalyst potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    High,
    Medium,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    StronglyPositive,
    ModeratelyPositive,
    NegativeLeaning,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    BullishOutlook,
    GrowthOptimism,
    BearishConcerns,
    RiskAversion,
    StrongConsensusBullish,
    StrongConsensusBearish,
    MixedSentimentSignals,
    HighEngagement,
    LowEngagement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Optimistic,
    Pessimistic,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierKind {
    PositiveOutlier,
    NegativeOutlier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub subject_id: String,
    pub score: f32,
    /// Signed distance from the mean subject score.
    pub deviation: f32,
    pub kind: OutlierKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAssessment {
    pub mood: Mood,
    pub potential_impact: Level,
    pub risk_level: Level,
    pub catalyst_potential: Level,
    pub trading_implications: Vec<String>,
    pub crowd_signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub strength: Strength,
    pub consensus: Level,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus_sentiment: Option<Sentiment>,
    pub consensus_ratio: f32,
    pub alignment: Alignment,
    pub outliers: Vec<Outlier>,
    pub themes: Vec<Theme>,
    pub market: MarketAssessment,
}

pub fn derive(report: &AnalysisReport) -> Insights {
    let subjects: Vec<&SubjectSentiment> = report.analyzed().collect();
    let overall = &report.overall;

    let strength = strength_of(overall.score);
    let (consensus_sentiment, consensus_ratio) = consensus_of(&subjects);
    let consensus = if consensus_ratio > HIGH_CONSENSUS {
        Level::High
    } else if consensus_ratio > MODERATE_CONSENSUS {
        Level::Moderate
    } else {
        Level::Low
    };
    let alignment = alignment_of(&subjects);
    let outliers = outliers_of(&subjects);
    let themes = themes_of(report, &subjects);

    let market = assess_market(
        report,
        strength,
        consensus,
        alignment,
        !outliers.is_empty(),
        themes.contains(&Theme::HighEngagement),
    );

    Insights {
        strength,
        consensus,
        consensus_sentiment,
        consensus_ratio: round2(consensus_ratio),
        alignment,
        outliers,
        themes,
        market,
    }
}

fn strength_of(score: f32) -> Strength {
    let s = score.abs();
    if s > STRONG_SCORE {
        Strength::Strong
    } else if s > MODERATE_SCORE {
        Strength::Moderate
    } else {
        Strength::Weak
    }
}

/// Most common label and its share. Ties resolve positive, negative, neutral.
fn consensus_of(subjects: &[&SubjectSentiment]) -> (Option<Sentiment>, f32) {
    if subjects.is_empty() {
        return (None, 0.0);
    }
    let count = |label: Sentiment| subjects.iter().filter(|s| s.sentiment == label).count();

    let mut best = (Sentiment::Positive, count(Sentiment::Positive));
    for label in [Sentiment::Negative, Sentiment::Neutral] {
        let c = count(label);
        if c > best.1 {
            best = (label, c);
        }
    }
    (Some(best.0), best.1 as f32 / subjects.len() as f32)
}

fn alignment_of(subjects: &[&SubjectSentiment]) -> Alignment {
    if subjects.is_empty() {
        return Alignment::Mixed;
    }
    let positive = subjects
        .iter()
        .filter(|s| s.sentiment == Sentiment::Positive)
        .count();
    let ratio = positive as f32 / subjects.len() as f32;
    if ratio > 0.7 {
        Alignment::StronglyPositive
    } else if ratio > 0.5 {
        Alignment::ModeratelyPositive
    } else if ratio < 0.3 {
        Alignment::NegativeLeaning
    } else {
        Alignment::Mixed
    }
}

fn outliers_of(subjects: &[&SubjectSentiment]) -> Vec<Outlier> {
    if subjects.len() <= 2 {
        return Vec::new();
    }
    let mean = subjects.iter().map(|s| s.score).sum::<f32>() / subjects.len() as f32;

    subjects
        .iter()
        .filter(|s| (s.score - mean).abs() > OUTLIER_DEVIATION)
        .map(|s| Outlier {
            subject_id: s.subject_id.clone(),
            score: s.score,
            deviation: round2(s.score - mean),
            kind: if s.score > mean {
                OutlierKind::PositiveOutlier
            } else {
                OutlierKind::NegativeOutlier
            },
        })
        .collect()
}

fn themes_of(report: &AnalysisReport, subjects: &[&SubjectSentiment]) -> Vec<Theme> {
    let mut themes = Vec::new();
    match report.overall.sentiment {
        Sentiment::Positive => themes.extend([Theme::BullishOutlook, Theme::GrowthOptimism]),
        Sentiment::Negative => themes.extend([Theme::BearishConcerns, Theme::RiskAversion]),
        Sentiment::Neutral => {}
    }

    let pos = subjects
        .iter()
        .filter(|s| s.sentiment == Sentiment::Positive)
        .count();
    let neg = subjects
        .iter()
        .filter(|s| s.sentiment == Sentiment::Negative)
        .count();
    themes.push(if pos > neg * 2 {
        Theme::StrongConsensusBullish
    } else if neg > pos * 2 {
        Theme::StrongConsensusBearish
    } else {
        Theme::MixedSentimentSignals
    });

    let items = report.overall.total_items;
    if items > HIGH_ENGAGEMENT_ITEMS {
        themes.push(Theme::HighEngagement);
    } else if items < LOW_ENGAGEMENT_ITEMS {
        themes.push(Theme::LowEngagement);
    }
    themes
}

fn assess_market(
    report: &AnalysisReport,
    strength: Strength,
    consensus: Level,
    alignment: Alignment,
    has_outliers: bool,
    high_engagement: bool,
) -> MarketAssessment {
    let score = report.overall.score;

    let mood = if score > MOOD_THRESHOLD {
        Mood::Optimistic
    } else if score < -MOOD_THRESHOLD {
        Mood::Pessimistic
    } else {
        Mood::Neutral
    };

    let potential_impact = if strength == Strength::Strong && consensus == Level::High {
        Level::High
    } else if strength != Strength::Weak || consensus != Level::Low {
        Level::Medium
    } else {
        Level::Low
    };

    let risk_level = if alignment == Alignment::Mixed && consensus == Level::Low {
        Level::High
    } else if strength == Strength::Strong && consensus == Level::High {
        Level::Low
    } else {
        Level::Medium
    };

    let mut trading_implications = Vec::new();
    if score > IMPLICATION_THRESHOLD && consensus == Level::High {
        trading_implications.push("Strong bullish sentiment may drive buying pressure".to_string());
    } else if score < -IMPLICATION_THRESHOLD && consensus == Level::High {
        trading_implications.push("Strong bearish sentiment may increase selling pressure".to_string());
    }
    if alignment == Alignment::Mixed {
        trading_implications.push("Mixed signals suggest increased volatility potential".to_string());
    }

    let subjects = report.overall.subjects_analyzed;
    let items = report.overall.total_items;
    let catalyst_potential = if subjects > 8 && items > 40 && strength == Strength::Strong {
        Level::High
    } else if subjects > 5 && items > 20 {
        Level::Medium
    } else {
        Level::Low
    };

    let mut crowd_signals = Vec::new();
    if consensus == Level::High && strength == Strength::Strong {
        crowd_signals.push("Strong consensus detected".to_string());
    }
    if has_outliers {
        crowd_signals.push("Contrarian voices identified".to_string());
    }
    if high_engagement {
        crowd_signals.push("High community engagement".to_string());
    }

    MarketAssessment {
        mood,
        potential_impact,
        risk_level,
        catalyst_potential,
        trading_implications,
        crowd_signals,
    }
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}
