// tests/cache_single_flight.rs
//
// Freshness cache under concurrency and across TTL boundaries, driven by a manual clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use crowd_sentiment::clock::ManualClock;
use crowd_sentiment::ingest::cache::{CacheKey, FreshnessCache};
use crowd_sentiment::ingest::types::{ContentItem, FetchIntent};
use crowd_sentiment::source_weights::SourceKind;

const TTL: Duration = Duration::from_secs(7200);

fn setup() -> (Arc<FreshnessCache>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 8, 16, 9, 0, 0).unwrap(),
    ));
    (Arc::new(FreshnessCache::new(clock.clone())), clock)
}

fn payload(tag: &str) -> Vec<ContentItem> {
    vec![ContentItem::new(
        "subject",
        SourceKind::GeneralRSS,
        tag,
        Utc.with_ymd_and_hms(2025, 8, 16, 8, 0, 0).unwrap(),
    )]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_same_key_fetches_once() {
    let (cache, _clock) = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            let key = CacheKey::new("elonmusk", FetchIntent::Recent, &[]);
            cache
                .get_or_fetch(key, TTL, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(payload("only once"))
                })
                .await
        }));
    }

    for h in handles {
        let items = h.await.expect("join").expect("fetch ok");
        assert_eq!(items[0].text, "only once");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_keys_do_not_wait_on_each_other() {
    let (cache, _clock) = setup();
    let gate = Arc::new(tokio::sync::Notify::new());

    // Holds the "slow" key until the fast key has finished.
    let slow = {
        let cache = cache.clone();
        let gate = gate.clone();
        tokio::spawn(async move {
            cache
                .get_or_fetch(
                    CacheKey::new("slow", FetchIntent::Recent, &[]),
                    TTL,
                    move || async move {
                        gate.notified().await;
                        Ok(payload("slow"))
                    },
                )
                .await
        })
    };

    let fast = tokio::time::timeout(
        Duration::from_secs(2),
        cache.get_or_fetch(
            CacheKey::new("fast", FetchIntent::Recent, &[]),
            TTL,
            || async { Ok(payload("fast")) },
        ),
    )
    .await
    .expect("fast key must not block behind slow key")
    .unwrap();
    assert_eq!(fast[0].text, "fast");

    gate.notify_one();
    assert_eq!(slow.await.unwrap().unwrap()[0].text, "slow");
}

#[tokio::test]
async fn intents_and_symbol_filters_never_collide() {
    let (cache, _clock) = setup();
    let recent = CacheKey::new("cathiedwood", FetchIntent::Recent, &[]);
    let historical = CacheKey::new("cathiedwood", FetchIntent::Historical, &[]);
    let filtered = CacheKey::new("cathiedwood", FetchIntent::Recent, &["TSLA".to_string()]);

    cache.get_or_fetch(recent.clone(), TTL, || async { Ok(payload("r")) }).await.unwrap();
    let h = cache.get_or_fetch(historical, TTL, || async { Ok(payload("h")) }).await.unwrap();
    let f = cache.get_or_fetch(filtered, TTL, || async { Ok(payload("f")) }).await.unwrap();
    let r = cache.get_or_fetch(recent, TTL, || async { Ok(payload("other")) }).await.unwrap();

    assert_eq!(h[0].text, "h");
    assert_eq!(f[0].text, "f");
    assert_eq!(r[0].text, "r");
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn expiry_boundary_and_failed_refresh() {
    let (cache, clock) = setup();
    let key = CacheKey::new("chamath", FetchIntent::Recent, &[]);

    cache.get_or_fetch(key.clone(), TTL, || async { Ok(payload("v1")) }).await.unwrap();

    // One second before expiry: still a hit.
    clock.advance(TTL - Duration::from_secs(1));
    let hit = cache.get_or_fetch(key.clone(), TTL, || async { Ok(payload("v2")) }).await.unwrap();
    assert_eq!(hit[0].text, "v1");

    // Exactly at ttl the entry is stale; a failing refresh surfaces the error.
    clock.advance(Duration::from_secs(1));
    let err = cache
        .get_or_fetch(key.clone(), TTL, || async { Err(anyhow::anyhow!("timeout")) })
        .await;
    assert!(err.is_err());

    // Nothing was cached by the failure: next call fetches again.
    let fresh = cache.get_or_fetch(key.clone(), TTL, || async { Ok(payload("v3")) }).await.unwrap();
    assert_eq!(fresh[0].text, "v3");
    assert_eq!(cache.peek(&key).await.unwrap().payload[0].text, "v3");
}
