use std::collections::HashMap;

use shuttle_axum::axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use metrics::gauge;
use tower_http::cors::CorsLayer;

use crate::analyze::ScoreBreakdown;
use crate::engine::{AnalysisReport, SentimentEngine};
use crate::insights::{self, Insights};
use crate::metrics::Metrics;
use crate::source_weights::SourceKind;

#[derive(Clone)]
pub struct AppState {
    pub engine: SentimentEngine,
    pub metrics: Metrics,
}

impl AppState {
    /// Installs the metrics recorder before publishing the configured TTL.
    pub fn new(engine: SentimentEngine) -> Self {
        let metrics = Metrics::init();
        gauge!("sentiment_cache_ttl_secs").set(engine.config().cache.recent_ttl_secs as f64);
        Self { engine, metrics }
    }
}

pub fn router(state: AppState) -> Router {
    let metrics = state.metrics.router();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score))
        .route("/analyze", post(analyze))
        .route("/debug/source-weight", get(debug_source_weight))
        .merge(metrics)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct ScoreReq {
    text: String,
}

async fn score(State(state): State<AppState>, Json(body): Json<ScoreReq>) -> Json<ScoreBreakdown> {
    Json(state.engine.scorer().score_text(&body.text))
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    subjects: Vec<String>,
    #[serde(default)]
    symbols: Option<Vec<String>>,
}

#[derive(serde::Serialize)]
struct AnalyzeResp {
    report: AnalysisReport,
    insights: Insights,
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Json<AnalyzeResp> {
    let report = state
        .engine
        .analyze_subjects(&body.subjects, body.symbols.as_deref())
        .await;
    let insights = insights::derive(&report);
    tracing::debug!(
        target: "api",
        subjects = body.subjects.len(),
        errors = report.errors.len(),
        "analyze served"
    );
    Json(AnalyzeResp { report, insights })
}

#[derive(serde::Serialize)]
struct SourceWeightOut {
    source: String,
    kind: SourceKind,
    weight: f32,
}

async fn debug_source_weight(Query(q): Query<HashMap<String, String>>) -> Json<SourceWeightOut> {
    let source = q.get("source").cloned().unwrap_or_default();
    let kind = SourceKind::from_label(&source);
    Json(SourceWeightOut {
        source,
        kind,
        weight: kind.weight(),
    })
}
