// tests/aggregation_props.rs
//
// Aggregation properties over seeded random inputs, plus the worked examples.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crowd_sentiment::aggregate::{aggregate_batch, aggregate_subject};
use crowd_sentiment::analyze::combine;
use crowd_sentiment::sentiment::{ItemSentiment, MethodKind, MethodScore, Sentiment};
use crowd_sentiment::source_weights::SourceKind;

fn random_items(rng: &mut StdRng, n: usize) -> Vec<(ItemSentiment, SourceKind)> {
    (0..n)
        .map(|_| {
            let item = ItemSentiment::new(
                rng.random_range(-1.0..=1.0),
                rng.random_range(0.0..=1.0),
                rng.random_range(1..=3),
            );
            let source = SourceKind::ALL[rng.random_range(0..SourceKind::ALL.len())];
            (item, source)
        })
        .collect()
}

#[test]
fn subject_and_batch_stay_in_range_with_consistent_labels() {
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for round in 0..200 {
        let n_subjects = rng.random_range(0..6);
        let subjects: Vec<_> = (0..n_subjects)
            .map(|i| {
                let n = rng.random_range(0..12);
                aggregate_subject(&format!("s{round}-{i}"), &random_items(&mut rng, n))
            })
            .collect();

        for s in &subjects {
            assert!((-1.0..=1.0).contains(&s.score), "{s:?}");
            assert!((0.0..=0.9).contains(&s.confidence), "{s:?}");
            assert_eq!(s.sentiment, Sentiment::from_score(s.score));
            assert_eq!(s.distribution.total(), s.item_count);
        }

        let b = aggregate_batch(&subjects);
        assert!((-1.0..=1.0).contains(&b.score));
        assert!((0.0..=0.9).contains(&b.confidence));
        assert_eq!(b.sentiment, Sentiment::from_score(b.score));
        assert_eq!(
            b.total_items,
            subjects.iter().map(|s| s.item_count).sum::<usize>()
        );
    }
}

#[test]
fn combined_item_score_is_bounded_by_its_methods() {
    let mut rng = StdRng::seed_from_u64(42);
    let kinds = [MethodKind::Keyword, MethodKind::Pattern, MethodKind::Contextual];

    for _ in 0..500 {
        let n = rng.random_range(1..=3);
        let scores: Vec<_> = kinds[..n]
            .iter()
            .map(|k| MethodScore::new(*k, rng.random_range(-1.0..=1.0), rng.random_range(0.0..=1.0)))
            .collect();
        let item = combine(&scores).expect("non-empty input");

        let lo = scores.iter().map(|s| s.score).fold(f32::INFINITY, f32::min);
        let hi = scores.iter().map(|s| s.score).fold(f32::NEG_INFINITY, f32::max);
        assert!(item.score >= lo - 1e-5 && item.score <= hi + 1e-5);
        assert!(item.confidence <= 0.95);
        assert_eq!(item.contributing_methods, n);
    }
}

#[test]
fn adding_a_more_positive_item_never_lowers_the_score() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let n = rng.random_range(1..8);
        let mut items = random_items(&mut rng, n);
        let before = aggregate_subject("x", &items);

        let bump = (before.score + rng.random_range(0.0..=0.5)).min(1.0);
        items.push((ItemSentiment::new(bump, rng.random_range(0.1..=1.0), 1), SourceKind::NewsWire));
        let after = aggregate_subject("x", &items);

        assert!(after.score >= before.score - 1e-5, "{before:?} -> {after:?}");
    }
}

#[test]
fn a_confident_newswire_max_never_lowers_the_subject_score() {
    let mut rng = StdRng::seed_from_u64(0xD0_0001);
    let top = (ItemSentiment::new(1.0, 0.95, 3), SourceKind::NewsWire);

    for _ in 0..300 {
        let n = rng.random_range(1..10);
        let mut items = random_items(&mut rng, n);
        let before = aggregate_subject("x", &items);

        items.push(top);
        let after = aggregate_subject("x", &items);

        assert!(after.score >= before.score - 1e-5, "{before:?} -> {after:?}");
    }
}

#[test]
fn worked_examples() {
    let subject = aggregate_subject(
        "demo",
        &[
            (ItemSentiment::new(0.6, 0.8, 1), SourceKind::NewsWire),
            (ItemSentiment::new(-0.2, 0.4, 1), SourceKind::Unknown),
        ],
    );
    assert!((subject.score - 0.44).abs() < 1e-5);
    assert_eq!(subject.sentiment, Sentiment::Positive);

    let mut a = aggregate_subject("a", &[]);
    a.score = 0.5;
    a.item_count = 10;
    a.confidence = 0.7;
    let mut b = aggregate_subject("b", &[]);
    b.score = -0.5;
    b.item_count = 2;
    b.confidence = 0.5;

    let batch = aggregate_batch(&[a, b]);
    assert!((batch.score - 0.375).abs() < 1e-5);
    assert_eq!(batch.sentiment, Sentiment::Positive);
    assert_eq!(batch.total_items, 12);
}
