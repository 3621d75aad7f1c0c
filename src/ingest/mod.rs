// src/ingest/mod.rs
pub mod providers;
pub mod types;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use url::Url;

/// Cap applied to normalized body text.
pub const MAX_BODY_CHARS: usize = 1500;
/// Cap applied to the display description.
pub const MAX_DESCRIPTION_CHARS: usize = 300;

pub const NO_DESCRIPTION: &str = "No description";
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// Normalize provider text: decode entities, strip tags, ASCII quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    truncate_chars(out, MAX_BODY_CHARS)
}

/// Normalize an optional field, returning `None` if nothing is left.
pub fn normalize_opt(s: Option<&str>) -> Option<String> {
    s.map(normalize_text).filter(|t| !t.is_empty())
}

/// First `max` characters, on a char boundary.
pub fn truncate_chars(s: String, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s
    }
}

/// Parse a provider timestamp; falls back to `now` for missing or unparseable values.
///
/// Accepted: RFC 3339, `2024-01-15T10:00:00+0000`, and naive `2024-01-15 10:00:00` (UTC).
pub fn parse_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc();
    }
    now
}

/// Calendar date `days_ago` days before `now`, in the given chrono format.
pub fn date_days_ago(now: DateTime<Utc>, days_ago: i64, fmt: &str) -> String {
    (now - ChronoDuration::days(days_ago)).format(fmt).to_string()
}

/// Tracking query parameters dropped from dedup keys.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
];

/// Canonical dedup key for an article URL.
///
/// Lowercases scheme/host, drops default port, fragment and tracking params,
/// sorts the remaining params and trims a trailing slash. Unparseable input
/// is returned trimmed but otherwise unchanged; empty stays empty.
pub fn canonical_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);
    // `Url` already lowercases scheme/host and elides default ports on parse.

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.to_ascii_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();
    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(params);
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    let mut out = parsed.to_string();
    if parsed.path() == "/" && parsed.query().is_none() && out.ends_with('/') {
        out.pop();
    }
    out
}
