//! Symbol and subject matching over raw text.

use once_cell::sync::Lazy;
use regex::Regex;

static CASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?P<tag>\$[a-z]{1,5})\b").expect("cashtag regex"));

/// Extract cashtags like `$TSLA`, `$spy`, allowing 1–5 letters.
/// Returns distinct, uppercase symbols (without `$`) in order of first appearance.
pub fn parse_cashtags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in CASHTAG.captures_iter(input) {
        if let Some(m) = caps.name("tag") {
            let t = m.as_str()[1..].to_ascii_uppercase();
            if !tags.contains(&t) {
                tags.push(t);
            }
        }
    }
    tags
}

/// Uppercase, trim, drop `$` prefix and empties; sorted and deduplicated.
pub fn clean_symbols(symbols: &[String]) -> Vec<String> {
    let mut out: Vec<String> = symbols
        .iter()
        .map(|s| s.trim().trim_start_matches('$').to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// First symbol from `symbols` mentioned in `text` as `$SYM` or as a standalone word.
/// An empty filter matches nothing here; use [`passes_filter`] for gating.
pub fn first_mentioned(text: &str, symbols: &[String]) -> Option<String> {
    let words = words_upper(text);
    symbols
        .iter()
        .map(|s| s.trim().trim_start_matches('$').to_ascii_uppercase())
        .find(|sym| !sym.is_empty() && words.iter().any(|w| w.trim_start_matches('$') == sym))
}

/// True when the filter is empty or the text mentions any of the symbols.
pub fn passes_filter(text: &str, symbols: &[String]) -> bool {
    symbols.is_empty() || first_mentioned(text, symbols).is_some()
}

/// Clean a subject handle: trim and drop a leading `@`.
pub fn clean_subject(subject_id: &str) -> String {
    subject_id.trim().trim_start_matches('@').trim().to_string()
}

/// Whether `text` mentions the subject (handle, `@handle`, `$HANDLE`, or the
/// handle spelled as a phrase), case-insensitive.
pub fn mentions_subject(text: &str, subject_id: &str) -> bool {
    let subject = clean_subject(subject_id).to_ascii_uppercase();
    if subject.is_empty() {
        return false;
    }
    let words = words_upper(text);
    if words
        .iter()
        .any(|w| w.trim_start_matches(['$', '@']) == subject)
    {
        return true;
    }
    // Multi-word subjects ("cathie wood") fall back to a substring check.
    subject.contains(' ') && text.to_ascii_uppercase().contains(&subject)
}

fn words_upper(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '$' || c == '@' || c == '_'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_uppercase())
        .collect()
}
