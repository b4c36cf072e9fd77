use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::counter;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::symbols::{first_mentioned, mentions_subject, parse_cashtags, passes_filter};
use crate::ingest::types::{ContentItem, ContentSupplier};
use crate::source_weights::SourceKind;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// Unparseable or missing dates map to the Unix epoch.
fn parse_rfc2822(ts: &str) -> DateTime<Utc> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| Utc.timestamp_opt(dt.unix_timestamp(), 0).single())
        .unwrap_or_default()
}

/// RSS 2.0 feed as a content supplier. Keeps items that mention the subject
/// and pass the symbol filter.
pub struct RssSupplier {
    mode: Mode,
    kind: SourceKind,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssSupplier {
    pub fn from_fixture_str(s: &str, kind: SourceKind) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            kind,
        }
    }

    pub fn from_url(url: impl Into<String>, kind: SourceKind, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
            kind,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    fn parse_items_from_str(
        &self,
        s: &str,
        subject_id: &str,
        symbols: &[String],
    ) -> Result<Vec<ContentItem>> {
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::new();
        for it in rss.channel.item {
            let text = format!(
                "{}. {}",
                it.title.as_deref().unwrap_or_default().trim(),
                it.description.as_deref().unwrap_or_default().trim()
            );
            if !mentions_subject(&text, subject_id) || !passes_filter(&text, symbols) {
                continue;
            }

            let symbol = first_mentioned(&text, symbols)
                .or_else(|| parse_cashtags(&text).into_iter().next());
            let ts = it.pub_date.as_deref().map(parse_rfc2822).unwrap_or_default();

            let mut item = ContentItem::new(subject_id, self.kind, text, ts);
            if let Some(sym) = symbol {
                item = item.with_symbol(sym);
            }
            if let Some(link) = it.link.filter(|l| !l.trim().is_empty()) {
                item = item.with_url(link.trim());
            }
            out.push(item);
        }
        Ok(out)
    }
}

#[async_trait]
impl ContentSupplier for RssSupplier {
    async fn fetch(&self, subject_id: &str, symbols: &[String]) -> Result<Vec<ContentItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, subject_id, symbols),
            Mode::Http { url, client } => {
                let resp = match client
                    .get(url.as_str())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                {
                    Ok(resp) => resp,
                    Err(e) => {
                        tracing::warn!(target: "ingest", error = ?e, status = ?e.status(), supplier = "rss", %url, "supplier http error");
                        counter!("sentiment_supplier_errors_total").increment(1);
                        let ctx = if e.is_status() { "rss http status" } else { "rss http get()" };
                        return Err(e).context(ctx);
                    }
                };
                let body = resp.text().await.context("rss http .text()")?;
                self.parse_items_from_str(&body, subject_id, symbols)
            }
        }
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
