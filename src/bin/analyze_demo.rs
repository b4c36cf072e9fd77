//! Demo that runs a batch through the synthetic supplier and prints the report as JSON.
//!
//! Usage: `analyze_demo chamath elonmusk --symbols TSLA,NVDA`
//! Without subjects the watchlist (`$SENTIMENT_WATCHLIST_PATH`, `config/watchlist.toml`) is used.

use std::sync::Arc;

use clap::Parser;
use crowd_sentiment::clock::{Clock, SystemClock};
use crowd_sentiment::config::EngineConfig;
use crowd_sentiment::ingest::config::{load_watchlist_default, Watchlist};
use crowd_sentiment::ingest::providers::SyntheticMarketSupplier;
use crowd_sentiment::{insights, SentimentEngine};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Subject handles to analyze
    subjects: Vec<String>,

    /// Restrict items to these symbols (comma-separated)
    #[arg(long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let Args {
        mut subjects,
        mut symbols,
    } = Args::parse();
    if subjects.is_empty() {
        let mut wl = load_watchlist_default()?;
        if wl.subjects.is_empty() {
            wl = Watchlist::default_seed();
        }
        subjects = wl.subjects;
        if symbols.is_none() && !wl.symbols.is_empty() {
            symbols = Some(wl.symbols);
        }
    }

    let cfg = EngineConfig::default();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let supplier = Arc::new(SyntheticMarketSupplier::new(
        clock.clone(),
        cfg.synthetic.max_items,
    ));
    let engine = SentimentEngine::new(supplier, clock, cfg);

    let report = engine.analyze_subjects(&subjects, symbols.as_deref()).await;
    let out = serde_json::json!({
        "report": report,
        "insights": insights::derive(&report),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_split_on_commas() {
        let args = Args::try_parse_from(["analyze_demo", "--symbols", "TSLA,NVDA", "chamath"])
            .unwrap();
        assert_eq!(args.subjects, vec!["chamath"]);
        assert_eq!(
            args.symbols,
            Some(vec!["TSLA".to_string(), "NVDA".to_string()])
        );
    }

    #[test]
    fn no_arguments_defers_to_watchlist() {
        let args = Args::try_parse_from(["analyze_demo"]).unwrap();
        assert!(args.subjects.is_empty());
        assert!(args.symbols.is_none());
    }

    #[test]
    fn symbols_flag_requires_a_value() {
        assert!(Args::try_parse_from(["analyze_demo", "elonmusk", "--symbols"]).is_err());
    }
}
