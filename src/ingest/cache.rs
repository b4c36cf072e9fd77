//! Freshness cache for fetched subject content.
//!
//! - Keyed by `(subject_id, intent, symbol filter)`; different intents never share a slot.
//! - An entry is valid while `now - produced_at < ttl`; a refetch supersedes it whole.
//! - Failed fetches are not cached, the next call retries.
//! - One in-flight fetch per key: concurrent callers for the same key wait on the
//!   slot and then read the fresh entry. Different keys never wait on each other.
//! - Each store sweeps slots that went stale (or never filled) and have no waiters.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::counter;

use crate::clock::Clock;
use crate::ingest::symbols::{clean_subject, clean_symbols};
use crate::ingest::types::{ContentItem, FetchIntent};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub subject_id: String,
    pub intent: FetchIntent,
    /// Sorted, uppercase symbol filter (empty = unfiltered).
    pub symbols: Vec<String>,
}

impl CacheKey {
    pub fn new(subject_id: &str, intent: FetchIntent, symbols: &[String]) -> Self {
        Self {
            subject_id: clean_subject(subject_id).to_ascii_lowercase(),
            intent,
            symbols: clean_symbols(symbols),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: Vec<ContentItem>,
    pub produced_at: DateTime<Utc>,
    /// TTL the entry was stored under; the sweep judges it by this.
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        // A clock that stepped backwards counts as age zero.
        let age = now
            .signed_duration_since(self.produced_at)
            .to_std()
            .unwrap_or_default();
        age < ttl
    }
}

type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

pub struct FreshnessCache {
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl FreshnessCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached payload if fresh, otherwise run `fetch`, store and return its result.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> Result<Vec<ContentItem>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ContentItem>>>,
    {
        let slot = self.slot(&key);
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if entry.is_fresh(self.clock.now(), ttl) {
                counter!("sentiment_cache_hits_total").increment(1);
                tracing::debug!(
                    target: "cache",
                    subject = %key.subject_id,
                    intent = key.intent.as_str(),
                    "cache hit"
                );
                return Ok(entry.payload.clone());
            }
        }

        counter!("sentiment_cache_misses_total").increment(1);
        tracing::debug!(
            target: "cache",
            subject = %key.subject_id,
            intent = key.intent.as_str(),
            "cache miss"
        );

        // On error the slot keeps whatever it had (possibly stale), so the next call refetches.
        let payload = fetch().await?;
        *guard = Some(CacheEntry {
            key,
            payload: payload.clone(),
            produced_at: self.clock.now(),
            ttl,
        });
        drop(guard);
        self.sweep();
        Ok(payload)
    }

    /// Drop slots nobody is waiting on whose entry is stale or missing.
    fn sweep(&self) {
        let now = self.clock.now();
        let mut map = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        let before = map.len();
        map.retain(|_, slot| {
            // The map holds one reference; any other is a caller on this key.
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|e| e.is_fresh(now, e.ttl)),
                Err(_) => true,
            }
        });
        let swept = before - map.len();
        if swept > 0 {
            tracing::debug!(target: "cache", swept, remaining = map.len(), "cache sweep");
        }
    }

    /// Snapshot of an entry regardless of freshness (diagnostics).
    pub async fn peek(&self, key: &CacheKey) -> Option<CacheEntry> {
        let slot = {
            let map = self.slots.lock().unwrap_or_else(|p| p.into_inner());
            map.get(key).cloned()
        }?;
        let guard = slot.lock().await;
        (*guard).clone()
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut map = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        map.entry(key.clone()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::source_weights::SourceKind;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 8, 16, 10, 0, 0).unwrap(),
        ))
    }

    fn payload(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| {
                ContentItem::new(
                    "spy",
                    SourceKind::NewsWire,
                    format!("item {i}"),
                    Utc.with_ymd_and_hms(2025, 8, 16, 9, 0, 0).unwrap(),
                )
            })
            .collect()
    }

    const TTL: Duration = Duration::from_secs(2 * 3600);

    #[tokio::test]
    async fn hit_within_ttl_skips_fetch() {
        let c = clock();
        let cache = FreshnessCache::new(c.clone());
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let key = CacheKey::new("SPY", FetchIntent::Recent, &[]);

        for _ in 0..3 {
            let got = cache
                .get_or_fetch(key.clone(), TTL, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(payload(2))
                })
                .await
                .unwrap();
            assert_eq!(got.len(), 2);
            c.advance(Duration::from_secs(600));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiry_is_strict_at_ttl() {
        let c = clock();
        let cache = FreshnessCache::new(c.clone());
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let key = CacheKey::new("spy", FetchIntent::Recent, &[]);
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(payload(1))
        };

        cache.get_or_fetch(key.clone(), TTL, fetch).await.unwrap();
        c.advance(TTL - Duration::from_secs(1));
        cache.get_or_fetch(key.clone(), TTL, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        c.advance(Duration::from_secs(1));
        cache.get_or_fetch(key.clone(), TTL, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let c = clock();
        let cache = FreshnessCache::new(c);
        let key = CacheKey::new("spy", FetchIntent::Recent, &[]);

        let err = cache
            .get_or_fetch(key.clone(), TTL, || async { Err(anyhow::anyhow!("boom")) })
            .await;
        assert!(err.is_err());
        assert!(cache.peek(&key).await.is_none());

        let ok = cache
            .get_or_fetch(key.clone(), TTL, || async { Ok(payload(3)) })
            .await
            .unwrap();
        assert_eq!(ok.len(), 3);
    }

    #[tokio::test]
    async fn intents_and_filters_do_not_collide() {
        let cache = FreshnessCache::new(clock());
        let recent = CacheKey::new("tsla", FetchIntent::Recent, &[]);
        let hist = CacheKey::new("tsla", FetchIntent::Historical, &[]);
        let filtered = CacheKey::new("tsla", FetchIntent::Recent, &["TSLA".to_string()]);

        cache.get_or_fetch(recent.clone(), TTL, || async { Ok(payload(1)) }).await.unwrap();
        let h = cache.get_or_fetch(hist, TTL, || async { Ok(payload(4)) }).await.unwrap();
        let f = cache.get_or_fetch(filtered, TTL, || async { Ok(payload(2)) }).await.unwrap();
        assert_eq!(h.len(), 4);
        assert_eq!(f.len(), 2);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn key_normalizes_subject_and_symbols() {
        let a = CacheKey::new("@ElonMusk", FetchIntent::Recent, &["tsla".into(), "$AAPL".into()]);
        let b = CacheKey::new("elonmusk", FetchIntent::Recent, &["AAPL".into(), "TSLA".into()]);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn stale_keys_are_reclaimed_on_next_store() {
        let c = clock();
        let cache = FreshnessCache::new(c.clone());
        let old = CacheKey::new("spy", FetchIntent::Recent, &[]);
        let young = CacheKey::new("qqq", FetchIntent::Recent, &[]);
        let next = CacheKey::new("dia", FetchIntent::Recent, &[]);

        cache.get_or_fetch(old.clone(), TTL, || async { Ok(payload(1)) }).await.unwrap();
        c.advance(TTL / 2);
        cache.get_or_fetch(young.clone(), TTL, || async { Ok(payload(1)) }).await.unwrap();
        assert_eq!(cache.len(), 2);

        c.advance(TTL / 2);
        cache.get_or_fetch(next, TTL, || async { Ok(payload(1)) }).await.unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.peek(&old).await.is_none());
        assert!(cache.peek(&young).await.is_some());
    }

    #[tokio::test]
    async fn failed_keys_do_not_pile_up() {
        let cache = FreshnessCache::new(clock());
        for i in 0..20 {
            let key = CacheKey::new(&format!("ghost{i}"), FetchIntent::Recent, &[]);
            let _ = cache
                .get_or_fetch(key, TTL, || async { Err(anyhow::anyhow!("down")) })
                .await;
        }
        let key = CacheKey::new("spy", FetchIntent::Recent, &[]);
        cache.get_or_fetch(key, TTL, || async { Ok(payload(1)) }).await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn sweep_respects_each_entry_ttl() {
        let c = clock();
        let cache = FreshnessCache::new(c.clone());
        let long = CacheKey::new("spy", FetchIntent::Historical, &[]);
        cache
            .get_or_fetch(long.clone(), TTL * 12, || async { Ok(payload(1)) })
            .await
            .unwrap();
        c.advance(TTL * 2);
        let short = CacheKey::new("spy", FetchIntent::Recent, &[]);
        cache.get_or_fetch(short, TTL, || async { Ok(payload(1)) }).await.unwrap();
        assert!(cache.peek(&long).await.is_some());
    }
}
