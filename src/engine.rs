//! # Sentiment Engine
//! Explicit engine instance holding its collaborators (supplier, clock, cache,
//! config). No process-wide mutable state: two engines never share a cache.
//!
//! Per subject: cached fetch → prepare (normalize, dedup, cap) → score items →
//! aggregate. Across subjects: concurrent tasks, results collected in input
//! order, failures isolated to their subject.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_batch, aggregate_subject};
use crate::analyze::ItemScorer;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::SubjectError;
use crate::ingest::cache::{CacheKey, FreshnessCache};
use crate::ingest::symbols::{clean_subject, clean_symbols};
use crate::ingest::types::{ContentSupplier, FetchIntent};
use crate::ingest::{ensure_metrics_described, prepare_items};
use crate::sentiment::{BatchSentiment, SubjectSentiment};

/// Result slot for one subject in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectOutcome {
    Analyzed(SubjectSentiment),
    Failed { error: String },
}

impl SubjectOutcome {
    pub fn sentiment(&self) -> Option<&SubjectSentiment> {
        match self {
            SubjectOutcome::Analyzed(s) => Some(s),
            SubjectOutcome::Failed { .. } => None,
        }
    }
}

/// Output of [`SentimentEngine::analyze_subjects`]. Always complete, never partial-by-error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub per_subject: BTreeMap<String, SubjectOutcome>,
    pub overall: BatchSentiment,
    /// Upstream failures, in input order.
    pub errors: Vec<String>,
    pub symbols: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Successfully analyzed subjects, in key order.
    pub fn analyzed(&self) -> impl Iterator<Item = &SubjectSentiment> {
        self.per_subject.values().filter_map(SubjectOutcome::sentiment)
    }
}

#[derive(Clone)]
pub struct SentimentEngine {
    supplier: Arc<dyn ContentSupplier>,
    clock: Arc<dyn Clock>,
    cache: Arc<FreshnessCache>,
    scorer: Arc<ItemScorer>,
    cfg: Arc<EngineConfig>,
}

impl SentimentEngine {
    pub fn new(supplier: Arc<dyn ContentSupplier>, clock: Arc<dyn Clock>, cfg: EngineConfig) -> Self {
        ensure_metrics_described();
        Self {
            supplier,
            cache: Arc::new(FreshnessCache::new(clock.clone())),
            clock,
            scorer: Arc::new(ItemScorer::default()),
            cfg: Arc::new(cfg),
        }
    }

    /// Replace the default method scorers.
    pub fn with_scorer(mut self, scorer: ItemScorer) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn cache(&self) -> &FreshnessCache {
        &self.cache
    }

    pub fn scorer(&self) -> &ItemScorer {
        &self.scorer
    }

    /// Fetch (through the cache), prepare, score and aggregate one subject.
    pub async fn analyze_subject(
        &self,
        subject_id: &str,
        symbols: &[String],
        intent: FetchIntent,
    ) -> Result<SubjectSentiment, SubjectError> {
        let key = CacheKey::new(subject_id, intent, symbols);
        let ttl = self.cfg.ttl_for(intent);

        let supplier = self.supplier.clone();
        let subject = subject_id.to_string();
        let filter = symbols.to_vec();
        let raw = self
            .cache
            .get_or_fetch(key, ttl, move || async move {
                let t0 = Instant::now();
                let res = supplier.fetch(&subject, &filter).await;
                histogram!("sentiment_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
                res
            })
            .await
            .map_err(|e| SubjectError::Fetch(format!("{e:#}")))?;

        let prepared = prepare_items(
            raw,
            self.cfg.ingest.near_duplicate_threshold,
            self.cfg.ingest.max_items_per_subject,
        );

        let scored: Vec<_> = prepared
            .items
            .iter()
            .filter_map(|it| self.scorer.score_item(&it.text).map(|s| (s, it.source)))
            .collect();
        counter!("sentiment_items_scored_total").increment(scored.len() as u64);

        if scored.is_empty() {
            return Err(SubjectError::NoContent);
        }

        let result = aggregate_subject(subject_id, &scored);
        tracing::debug!(
            target: "engine",
            subject = subject_id,
            items = result.item_count,
            dropped = prepared.dropped_empty + prepared.dropped_duplicate,
            score = result.score,
            "subject aggregated"
        );
        Ok(result)
    }

    /// Analyze subjects for recent sentiment.
    pub async fn analyze_subjects(
        &self,
        subject_ids: &[String],
        symbols: Option<&[String]>,
    ) -> AnalysisReport {
        self.analyze_subjects_with_intent(subject_ids, symbols, FetchIntent::Recent)
            .await
    }

    /// Subjects run as independent tasks. A failing subject is reported and
    /// left out of `overall`; it never aborts the batch.
    pub async fn analyze_subjects_with_intent(
        &self,
        subject_ids: &[String],
        symbols: Option<&[String]>,
        intent: FetchIntent,
    ) -> AnalysisReport {
        let t0 = Instant::now();
        let subjects = dedup_subjects(subject_ids);
        let symbols = clean_symbols(symbols.unwrap_or(&[]));

        let handles: Vec<_> = subjects
            .iter()
            .map(|s| {
                let engine = self.clone();
                let subject = s.clone();
                let filter = symbols.clone();
                let handle = tokio::spawn(async move {
                    engine.analyze_subject(&subject, &filter, intent).await
                });
                (s.clone(), handle)
            })
            .collect();

        let mut per_subject = BTreeMap::new();
        let mut analyzed = Vec::new();
        let mut errors = Vec::new();

        for (subject, handle) in handles {
            let outcome = match handle.await {
                Ok(r) => r,
                Err(e) => Err(SubjectError::Task(e.to_string())),
            };
            match outcome {
                Ok(s) => {
                    analyzed.push(s.clone());
                    per_subject.insert(subject, SubjectOutcome::Analyzed(s));
                }
                Err(e) => {
                    counter!("sentiment_subjects_failed_total").increment(1);
                    if e.is_reportable() {
                        tracing::warn!(target: "engine", subject = %subject, error = %e, "subject failed");
                        errors.push(format!("{subject}: {e}"));
                    } else {
                        tracing::info!(target: "engine", subject = %subject, "no content available");
                    }
                    per_subject.insert(
                        subject,
                        SubjectOutcome::Failed {
                            error: e.public_message().to_string(),
                        },
                    );
                }
            }
        }

        let overall = aggregate_batch(&analyzed);
        tracing::info!(
            target: "engine",
            subjects = subjects.len(),
            analyzed = overall.subjects_analyzed,
            failed = subjects.len() - analyzed.len(),
            items = overall.total_items,
            score = overall.score,
            sentiment = overall.sentiment.as_str(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "batch analyzed"
        );

        AnalysisReport {
            per_subject,
            overall,
            errors,
            symbols,
            generated_at: self.clock.now(),
        }
    }
}

/// Clean handles, drop empties, keep the first spelling of case-insensitive duplicates.
fn dedup_subjects(subject_ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    subject_ids
        .iter()
        .map(|s| clean_subject(s))
        .filter(|s| !s.is_empty() && seen.insert(s.to_ascii_lowercase()))
        .collect()
}
