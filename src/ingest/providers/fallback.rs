//! Ordered supplier chain: the first supplier with content wins.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;

use crate::ingest::types::{ContentItem, ContentSupplier};

pub struct FallbackSupplier {
    chain: Vec<Arc<dyn ContentSupplier>>,
}

impl FallbackSupplier {
    pub fn new(chain: Vec<Arc<dyn ContentSupplier>>) -> Self {
        Self { chain }
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl ContentSupplier for FallbackSupplier {
    /// Failures are logged and the next supplier is tried. If every supplier
    /// failed, the last error is returned; if they all came back empty, so does this.
    async fn fetch(&self, subject_id: &str, symbols: &[String]) -> Result<Vec<ContentItem>> {
        let mut last_err = None;
        let mut any_ok = false;

        for s in &self.chain {
            match s.fetch(subject_id, symbols).await {
                Ok(items) if !items.is_empty() => {
                    tracing::debug!(target: "ingest", supplier = s.name(), subject = subject_id, items = items.len(), "supplier produced content");
                    return Ok(items);
                }
                Ok(_) => {
                    any_ok = true;
                    tracing::debug!(target: "ingest", supplier = s.name(), subject = subject_id, "supplier returned nothing");
                }
                Err(e) => {
                    tracing::warn!(target: "ingest", supplier = s.name(), subject = subject_id, error = ?e, "supplier failed, trying next");
                    counter!("sentiment_supplier_errors_total").increment(1);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if !any_ok => Err(e),
            _ => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_weights::SourceKind;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        items: usize,
        fail: bool,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(items: usize, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                items,
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ContentSupplier for Fixed {
        async fn fetch(&self, subject_id: &str, _symbols: &[String]) -> Result<Vec<ContentItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("down");
            }
            Ok((0..self.items)
                .map(|i| ContentItem::new(subject_id, SourceKind::Unknown, format!("t{i}"), Utc::now()))
                .collect())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn first_non_empty_wins_and_later_are_skipped() {
        let (a, b, c) = (Fixed::new(0, true), Fixed::new(2, false), Fixed::new(5, false));
        let chain = FallbackSupplier::new(vec![a.clone(), b.clone(), c.clone()]);
        let got = chain.fetch("x", &[]).await.unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(c.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_failed_returns_error_all_empty_returns_empty() {
        let failing = FallbackSupplier::new(vec![Fixed::new(0, true), Fixed::new(0, true)]);
        assert!(failing.fetch("x", &[]).await.is_err());

        let mixed = FallbackSupplier::new(vec![Fixed::new(0, true), Fixed::new(0, false)]);
        assert!(mixed.fetch("x", &[]).await.unwrap().is_empty());
    }
}
