// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::source_weights::SourceKind;

/// One unit of text attributed to a subject and a source. Immutable once built.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ContentItem {
    pub text: String,
    pub source: SourceKind,
    pub timestamp: DateTime<Utc>,
    pub subject_id: String, // e.g., "elonmusk", "TSLA"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ContentItem {
    pub fn new(
        subject_id: impl Into<String>,
        source: SourceKind,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            text: text.into(),
            source,
            timestamp,
            subject_id: subject_id.into(),
            symbol: None,
            url: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Why content is being fetched. Each intent has its own TTL and its own cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchIntent {
    Recent,
    Historical,
}

impl FetchIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchIntent::Recent => "recent",
            FetchIntent::Historical => "historical",
        }
    }
}

/// External collaborator that produces raw content for a subject.
#[async_trait::async_trait]
pub trait ContentSupplier: Send + Sync {
    async fn fetch(&self, subject_id: &str, symbols: &[String]) -> Result<Vec<ContentItem>>;
    fn name(&self) -> &'static str;
}
