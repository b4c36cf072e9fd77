// src/ingest/providers/mod.rs
pub mod fallback;
pub mod news_search;
pub mod rss;
pub mod synthetic;

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::ingest::types::ContentSupplier;

pub use fallback::FallbackSupplier;
pub use news_search::NewsSearchSupplier;
pub use rss::RssSupplier;
pub use synthetic::SyntheticMarketSupplier;

/// Supplier chain in trust order: news search, configured RSS feeds, synthetic context.
pub fn from_config(cfg: &EngineConfig, clock: Arc<dyn Clock>) -> FallbackSupplier {
    let client = reqwest::Client::new();
    let mut chain: Vec<Arc<dyn ContentSupplier>> = Vec::new();

    if cfg.news_search.enabled {
        chain.push(Arc::new(NewsSearchSupplier::new(
            cfg.news_search.clone(),
            client.clone(),
            clock.clone(),
        )));
    }
    for feed in &cfg.rss.feeds {
        chain.push(Arc::new(RssSupplier::from_url(
            feed.url.clone(),
            feed.kind,
            client.clone(),
        )));
    }
    if cfg.synthetic.enabled {
        chain.push(Arc::new(SyntheticMarketSupplier::new(
            clock,
            cfg.synthetic.max_items,
        )));
    }

    tracing::info!(target: "ingest", suppliers = chain.len(), "supplier chain built");
    FallbackSupplier::new(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::RssFeed;
    use crate::source_weights::SourceKind;

    #[test]
    fn chain_follows_config() {
        let mut cfg = EngineConfig::default();
        assert_eq!(from_config(&cfg, Arc::new(SystemClock)).len(), 1);

        cfg.rss.feeds.push(RssFeed {
            url: "https://example.com/feed.xml".into(),
            kind: SourceKind::GeneralRSS,
        });
        cfg.synthetic.enabled = false;
        assert_eq!(from_config(&cfg, Arc::new(SystemClock)).len(), 1);

        cfg.news_search.enabled = true;
        assert_eq!(from_config(&cfg, Arc::new(SystemClock)).len(), 2);
    }
}
