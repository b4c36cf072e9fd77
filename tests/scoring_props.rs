// tests/scoring_props.rs
//
// Text-level scoring properties over seeded random inputs built from hostile fragments.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crowd_sentiment::analyze::{
    ContextualScorer, ItemScorer, KeywordScorer, MethodScorer, PatternScorer,
};
use crowd_sentiment::sentiment::{MethodScore, Sentiment};

const FRAGMENTS: &[&str] = &[
    "",
    " ",
    "\t\n",
    "\u{0}\u{7}\u{1b}[31m",
    "+999999999999999999999999999999999999999999%",
    "-99999999999999999999999999999999999999999.5 %",
    "(+0.0001%)",
    "-0%",
    "$1,000,000.00",
    "$TSLA",
    "$",
    "%%%",
    "🚀🚀🚀🚀🚀🚀🚀🚀",
    "💀💀💀💀💀💀",
    "📉🐻🩸😱",
    "TO THE MOON",
    "CRASH CRASH CRASH DUMP",
    "BULLISH BEARISH",
    "!!!!!!!!!!!!!!!!",
    "????????????",
    "bullish breakout surge",
    "terrible plunge collapse crash",
    "price target raised",
    "maybe perhaps uncertainty",
    "buy now asap today",
    "&nbsp;&mdash;&amp;&#x1F680;",
    "<script>alert(1)</script>",
    "https://example.com/a?b=c",
    "Ünïcødé ÄKTIE ΣΤΟΚ",
    "\u{202E}reversed\u{200B}",
    "in the red",
];

fn random_text(rng: &mut StdRng) -> String {
    let n = rng.random_range(0..12);
    let mut out = String::new();
    for _ in 0..n {
        out.push_str(FRAGMENTS[rng.random_range(0..FRAGMENTS.len())]);
        if rng.random_bool(0.6) {
            out.push(' ');
        }
    }
    out
}

fn assert_method_in_range(m: &MethodScore, text: &str) {
    assert!((-1.0..=1.0).contains(&m.score), "{m:?} for {text:?}");
    assert!((0.0..=1.0).contains(&m.confidence), "{m:?} for {text:?}");
    assert_eq!(m.sentiment, Sentiment::from_score(m.score), "{text:?}");
}

#[test]
fn method_scorers_stay_in_range_on_hostile_text() {
    let mut rng = StdRng::seed_from_u64(0xBAD_7E47);
    let scorers: [&dyn MethodScorer; 3] = [&KeywordScorer, &PatternScorer, &ContextualScorer];

    for _ in 0..2_000 {
        let text = random_text(&mut rng);
        for scorer in scorers {
            if let Some(m) = scorer.score(&text) {
                assert_eq!(m.method, scorer.kind());
                assert_method_in_range(&m, &text);
            }
        }
    }
}

#[test]
fn item_scorer_stays_in_range_on_hostile_text() {
    let mut rng = StdRng::seed_from_u64(0x17E5);
    let scorer = ItemScorer::default();

    for _ in 0..2_000 {
        let raw = random_text(&mut rng);
        let b = scorer.score_text(&raw);

        assert!(!b.normalized.chars().any(char::is_control), "{raw:?}");
        for m in &b.methods {
            assert_method_in_range(m, &raw);
        }
        match b.item {
            Some(item) => {
                assert!((-1.0..=1.0).contains(&item.score), "{item:?} for {raw:?}");
                assert!((0.0..=0.95).contains(&item.confidence), "{item:?} for {raw:?}");
                assert_eq!(item.sentiment, Sentiment::from_score(item.score));
                assert_eq!(item.contributing_methods, b.methods.len());
            }
            None => assert!(b.methods.is_empty() || b.normalized.is_empty(), "{raw:?}"),
        }
    }
}

#[test]
fn blank_and_control_only_text_is_unscorable() {
    let scorer = ItemScorer::default();
    for raw in ["", "   ", "\u{0}\u{1}\u{7f}", "\t\r\n"] {
        let b = scorer.score_text(raw);
        assert!(b.normalized.is_empty(), "{raw:?}");
        assert!(b.item.is_none(), "{raw:?}");
    }
    assert!(PatternScorer.score("").is_none());
    assert!(KeywordScorer.score("").is_none());
    assert!(ContextualScorer.score("").is_none());
}

#[test]
fn extreme_signed_percentages_saturate() {
    let up = ContextualScorer
        .score("+999999999999999999999999999999999999999999%")
        .unwrap();
    assert!(up.score.is_finite());
    assert_eq!(up.sentiment, Sentiment::Positive);

    let down = ContextualScorer
        .score("-99999999999999999999999999999999999999999.5 %")
        .unwrap();
    assert!(down.score.is_finite());
    assert_eq!(down.sentiment, Sentiment::Negative);
}
