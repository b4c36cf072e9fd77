//! Brave-style search API supplier (news + web).
//!
//! News hits become `NewsWire` items, web hits `SocialSearch`. Results are
//! de-duplicated by URL, ranked by a simple relevance score and capped.
//! Rate limiting is per supplier instance.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;

use crate::clock::Clock;
use crate::config::NewsSearchConfig;
use crate::ingest::symbols::{clean_subject, first_mentioned, parse_cashtags, passes_filter};
use crate::ingest::types::{ContentItem, ContentSupplier};
use crate::source_weights::SourceKind;

pub const MAX_RANKED_RESULTS: usize = 20;
pub const NEWS_BASE_RELEVANCE: f32 = 0.8;
pub const WEB_BASE_RELEVANCE: f32 = 0.7;

const FINANCIAL_KEYWORDS: &[&str] = &[
    "stock",
    "trading",
    "investment",
    "market",
    "bullish",
    "bearish",
    "price",
    "target",
];

/// Handle → names the person is written about under.
const PROFILE_TERMS: &[(&str, &[&str])] = &[
    ("elonmusk", &["Elon Musk", "Tesla CEO", "SpaceX"]),
    ("chamath", &["Chamath Palihapitiya", "Social Capital", "SPAC king"]),
    ("cathiedwood", &["Cathie Wood", "ARK Invest", "innovation investor"]),
    ("jimcramer", &["Jim Cramer", "Mad Money", "CNBC"]),
    ("garyblack00", &["Gary Black", "Tesla analyst"]),
    ("reformedbroker", &["Josh Brown", "Reformed Broker"]),
    ("teslacharts", &["Tesla Charts", "Tesla analysis"]),
    ("unusual_whales", &["Unusual Whales", "options flow"]),
    ("zerohedge", &["Zero Hedge", "financial news"]),
    ("stockmktnewz", &["Stock Market News", "trading news"]),
];

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct WebResponse {
    #[serde(default)]
    web: Option<NewsResponse>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    age: Option<String>,
}

/// One search result before it becomes a [`ContentItem`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub description: String,
    pub kind: SourceKind,
    pub published: DateTime<Utc>,
    pub relevance: f32,
}

impl SearchHit {
    fn text(&self) -> String {
        format!("{} {}", self.title.trim(), self.description.trim())
    }
}

pub struct NewsSearchSupplier {
    cfg: NewsSearchConfig,
    api_key: Option<String>,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    last_request: tokio::sync::Mutex<Option<tokio::time::Instant>>,
}

impl NewsSearchSupplier {
    pub fn new(cfg: NewsSearchConfig, client: reqwest::Client, clock: Arc<dyn Clock>) -> Self {
        let api_key = cfg.resolved_api_key();
        if api_key.is_none() {
            tracing::warn!(target: "ingest", supplier = "news_search", "no search API key configured; supplier returns nothing");
        }
        Self {
            cfg,
            api_key,
            client,
            clock,
            last_request: tokio::sync::Mutex::new(None),
        }
    }

    async fn rate_limit(&self) {
        let delay = Duration::from_millis(self.cfg.rate_limit_ms);
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < delay {
                tokio::time::sleep(delay - elapsed).await;
            }
        }
        *last = Some(tokio::time::Instant::now());
    }

    async fn get(&self, endpoint: &str, query: &str, key: &str) -> Result<String> {
        self.rate_limit().await;
        let url = format!("{}/{}/search", self.cfg.base_url.trim_end_matches('/'), endpoint);
        let count = self.cfg.results_per_query.min(20).to_string();
        let mut params: Vec<(&str, &str)> = vec![("q", query), ("count", count.as_str())];
        if endpoint == "news" {
            params.push(("freshness", "pd"));
        }
        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", key)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("search {endpoint} get()"))?
            .error_for_status()
            .with_context(|| format!("search {endpoint} status"))?;
        resp.text().await.context("search .text()")
    }
}

#[async_trait]
impl ContentSupplier for NewsSearchSupplier {
    async fn fetch(&self, subject_id: &str, symbols: &[String]) -> Result<Vec<ContentItem>> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };
        let now = self.clock.now();
        let queries = build_queries(subject_id, symbols, self.cfg.max_queries);

        let mut hits: Vec<SearchHit> = Vec::new();
        let mut succeeded = 0usize;
        let mut last_err: Option<anyhow::Error> = None;

        for q in &queries {
            for endpoint in ["news", "web"] {
                let parsed = match self.get(endpoint, q, key).await {
                    Ok(body) if endpoint == "news" => parse_news_hits(&body, now),
                    Ok(body) => parse_web_hits(&body, now),
                    Err(e) => Err(e),
                };
                match parsed {
                    Ok(mut h) => {
                        succeeded += 1;
                        hits.append(&mut h);
                    }
                    Err(e) => {
                        tracing::warn!(target: "ingest", supplier = "news_search", endpoint, error = ?e, "search query failed");
                        counter!("sentiment_supplier_errors_total").increment(1);
                        last_err = Some(e);
                    }
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = last_err {
                return Err(e.context("every search query failed"));
            }
        }

        let ranked = dedup_and_rank(hits, subject_id, symbols);
        Ok(ranked
            .into_iter()
            .filter_map(|h| {
                let text = h.text();
                if !passes_filter(&text, symbols) {
                    return None;
                }
                let symbol = first_mentioned(&text, symbols)
                    .or_else(|| parse_cashtags(&text).into_iter().next());
                let mut item = ContentItem::new(subject_id, h.kind, text, h.published);
                if let Some(sym) = symbol {
                    item = item.with_symbol(sym);
                }
                Some(item.with_url(h.url))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "news_search"
    }
}

/// Search queries for a subject, most specific first, at most `max`.
pub fn build_queries(subject_id: &str, symbols: &[String], max: usize) -> Vec<String> {
    let subject = clean_subject(subject_id);
    let lower = subject.to_lowercase();
    let terms: Vec<String> = PROFILE_TERMS
        .iter()
        .find(|(handle, _)| *handle == lower)
        .map(|(_, names)| names.iter().map(|s| s.to_string()).collect())
        .unwrap_or_else(|| vec![subject.clone()]);

    let mut queries = Vec::new();
    for term in terms.iter().take(3) {
        queries.push(format!("\"{term}\" stock market"));
        queries.push(format!("\"{term}\" trading investment"));
        if !symbols.is_empty() {
            let syms: Vec<&str> = symbols.iter().take(3).map(String::as_str).collect();
            queries.push(format!("\"{term}\" {}", syms.join(" OR ")));
        }
    }
    queries.push(format!("{subject} bullish bearish prediction"));
    queries.push(format!("{subject} stock pick recommendation"));
    queries.push(format!("{subject} market outlook sentiment"));

    queries.truncate(max);
    queries
}

/// "2 hours ago", "3 days ago", "15 minutes ago"; anything else is `now`.
pub fn parse_relative_age(age: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let lower = age.trim().to_lowercase();
    let Some(n) = lower
        .split_whitespace()
        .next()
        .and_then(|t| t.parse::<i64>().ok())
    else {
        return now;
    };
    let delta = if lower.contains("minute") {
        chrono::Duration::minutes(n)
    } else if lower.contains("hour") {
        chrono::Duration::hours(n)
    } else if lower.contains("day") {
        chrono::Duration::days(n)
    } else {
        return now;
    };
    now - delta
}

fn to_hits(raw: Vec<RawHit>, kind: SourceKind, now: DateTime<Utc>) -> Vec<SearchHit> {
    let base = if kind == SourceKind::NewsWire {
        NEWS_BASE_RELEVANCE
    } else {
        WEB_BASE_RELEVANCE
    };
    raw.into_iter()
        .map(|r| SearchHit {
            published: r
                .age
                .as_deref()
                .map(|a| parse_relative_age(a, now))
                .unwrap_or(now),
            title: r.title,
            url: r.url,
            description: r.description,
            kind,
            relevance: base,
        })
        .collect()
}

pub fn parse_news_hits(body: &str, now: DateTime<Utc>) -> Result<Vec<SearchHit>> {
    let resp: NewsResponse = serde_json::from_str(body).context("parsing news search json")?;
    Ok(to_hits(resp.results, SourceKind::NewsWire, now))
}

/// Web results carry no dates; they are stamped `now`.
pub fn parse_web_hits(body: &str, now: DateTime<Utc>) -> Result<Vec<SearchHit>> {
    let resp: WebResponse = serde_json::from_str(body).context("parsing web search json")?;
    let raw = resp.web.map(|w| w.results).unwrap_or_default();
    let mut hits = to_hits(raw, SourceKind::SocialSearch, now);
    for h in &mut hits {
        h.published = now;
    }
    Ok(hits)
}

/// Drop hits without URL or with a URL already seen, score relevance, keep the best.
pub fn dedup_and_rank(hits: Vec<SearchHit>, subject_id: &str, symbols: &[String]) -> Vec<SearchHit> {
    let subject = clean_subject(subject_id).to_lowercase();
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<SearchHit> = Vec::new();

    for mut h in hits {
        if h.url.is_empty() || !seen.insert(h.url.clone()) {
            continue;
        }
        let text = h.text().to_lowercase();
        let mut score = h.relevance;
        if !subject.is_empty() && text.contains(&subject) {
            score += 0.3;
        }
        for sym in symbols {
            if text.contains(&sym.to_lowercase()) {
                score += 0.2;
            }
        }
        score += 0.1 * FINANCIAL_KEYWORDS.iter().filter(|k| text.contains(*k)).count() as f32;
        if h.kind == SourceKind::NewsWire {
            score += 0.1;
        }
        h.relevance = score.min(1.0);
        out.push(h);
    }

    // Stable: equal relevance keeps arrival order.
    out.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    out.truncate(MAX_RANKED_RESULTS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn queries_use_profile_names_and_cap() {
        let q = build_queries("@elonmusk", &["TSLA".into()], 3);
        assert_eq!(
            q,
            vec![
                "\"Elon Musk\" stock market".to_string(),
                "\"Elon Musk\" trading investment".to_string(),
                "\"Elon Musk\" TSLA".to_string(),
            ]
        );
        let unknown = build_queries("somebody", &[], 10);
        assert_eq!(unknown[0], "\"somebody\" stock market");
        assert_eq!(unknown.len(), 5);
    }

    #[test]
    fn relative_ages() {
        let n = now();
        assert_eq!(parse_relative_age("2 hours ago", n), n - chrono::Duration::hours(2));
        assert_eq!(parse_relative_age("3 days ago", n), n - chrono::Duration::days(3));
        assert_eq!(parse_relative_age("15 minutes ago", n), n - chrono::Duration::minutes(15));
        assert_eq!(parse_relative_age("yesterday", n), n);
        assert_eq!(parse_relative_age("", n), n);
    }

    #[test]
    fn parses_news_and_web_shapes() {
        let news = r#"{"results":[{"title":"Musk says","url":"https://n/1","description":"d","age":"1 hour ago"}]}"#;
        let h = parse_news_hits(news, now()).unwrap();
        assert_eq!(h[0].kind, SourceKind::NewsWire);
        assert_eq!(h[0].published, now() - chrono::Duration::hours(1));

        let web = r#"{"web":{"results":[{"title":"t","url":"https://w/1","description":"x"}]}}"#;
        let w = parse_web_hits(web, now()).unwrap();
        assert_eq!(w[0].kind, SourceKind::SocialSearch);
        assert_eq!(w[0].published, now());

        assert!(parse_web_hits("{}", now()).unwrap().is_empty());
        assert!(parse_news_hits("not json", now()).is_err());
    }

    #[test]
    fn ranking_dedups_and_prefers_relevant_news() {
        let hit = |url: &str, title: &str, kind: SourceKind| SearchHit {
            title: title.into(),
            url: url.into(),
            description: String::new(),
            kind,
            published: now(),
            relevance: if kind == SourceKind::NewsWire { 0.8 } else { 0.7 },
        };
        let ranked = dedup_and_rank(
            vec![
                hit("https://w/1", "random blog", SourceKind::SocialSearch),
                hit("https://n/1", "chamath on market", SourceKind::NewsWire),
                hit("https://n/1", "duplicate", SourceKind::NewsWire),
                hit("", "no url", SourceKind::NewsWire),
            ],
            "chamath",
            &[],
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].url, "https://n/1");
        assert_eq!(ranked[0].relevance, 1.0);
        assert!((ranked[1].relevance - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn missing_key_yields_empty() {
        let cfg = NewsSearchConfig {
            enabled: true,
            api_key: String::new(),
            ..NewsSearchConfig::default()
        };
        let s = NewsSearchSupplier::new(
            cfg,
            reqwest::Client::new(),
            Arc::new(ManualClock::new(now())),
        );
        assert!(s.fetch("elonmusk", &[]).await.unwrap().is_empty());
    }
}
