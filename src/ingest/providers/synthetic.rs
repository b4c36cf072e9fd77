//! Synthetic market-context supplier: a last resort when no real source has content.
//!
//! Output is deterministic for a given clock and always labelled
//! [`SourceKind::SyntheticMarketContext`], so its lower reliability weight applies.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::clock::Clock;
use crate::ingest::symbols::clean_symbols;
use crate::ingest::types::{ContentItem, ContentSupplier};
use crate::source_weights::SourceKind;

pub const DEFAULT_SYMBOL: &str = "SPY";
/// Spacing between generated items, newest first.
pub const ITEM_SPACING_HOURS: i64 = 2;

const TEMPLATES: &[&str] = &[
    "Watching ${sym} closely today. The technicals look interesting 📈",
    "Big volume on ${sym} - something brewing here? 🤔",
    "${sym} breaking out of resistance. Time to pay attention! 🚀",
    "Earnings week for ${sym}. Expecting volatility ahead ⚡",
    "Love the long-term story on ${sym}. Building position gradually 💪",
    "Market sentiment shifting on ${sym}. Bears getting nervous? 🐻",
    "${sym} chart looking clean. Potential breakout setup forming 📊",
    "Insider activity on ${sym} worth noting. Following closely 👀",
    "Risk/reward favorable on ${sym} at these levels 💎",
    "Multiple catalysts lining up for ${sym} in Q4 🎯",
];

pub struct SyntheticMarketSupplier {
    clock: Arc<dyn Clock>,
    max_items: usize,
}

impl SyntheticMarketSupplier {
    pub fn new(clock: Arc<dyn Clock>, max_items: usize) -> Self {
        Self { clock, max_items }
    }
}

#[async_trait]
impl ContentSupplier for SyntheticMarketSupplier {
    async fn fetch(&self, subject_id: &str, symbols: &[String]) -> Result<Vec<ContentItem>> {
        let symbols = clean_symbols(symbols);
        let now = self.clock.now();
        let n = self.max_items.min(TEMPLATES.len());

        let items = TEMPLATES
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, tpl)| {
                let sym = symbols
                    .get(i % symbols.len().max(1))
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_SYMBOL);
                let text = tpl.replace("${sym}", &format!("${sym}"));
                let ts = now - chrono::Duration::hours(ITEM_SPACING_HOURS * i as i64);
                ContentItem::new(subject_id, SourceKind::SyntheticMarketContext, text, ts)
                    .with_symbol(sym)
            })
            .collect::<Vec<_>>();

        tracing::debug!(target: "ingest", subject = subject_id, items = items.len(), "synthetic market context generated");
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}
