// src/config/mod.rs
pub mod engine;

pub use engine::{
    CacheConfig, EngineConfig, IngestConfig, NewsSearchConfig, RssConfig, RssFeed,
    SyntheticConfig,
};
