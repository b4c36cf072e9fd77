// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod analyze;
pub mod api;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod insights;
pub mod metrics;
pub mod sentiment;
pub mod source_weights;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::engine::{AnalysisReport, SentimentEngine, SubjectOutcome};
pub use crate::sentiment::{BatchSentiment, ItemSentiment, Sentiment, SubjectSentiment};
