//! String normalization helpers shared by the loader and the filter pipeline.
//!
//! All functions here are total: malformed input degrades to an empty or
//! absent value instead of an error.

use chrono::{NaiveDate, NaiveDateTime};
use regex_lite::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Parent references that mean "no parent" once trimmed and lowercased.
pub const NO_PARENT_SENTINELS: [&str; 3] = ["", "none", "-"];

/// Default literal used by the source exports for a missing date.
pub const DATE_NOT_RECORDED: &str = "Date not recorded";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*>").expect("valid tag pattern"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z]{2,8});").expect("valid entity pattern")
});

static KEY_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[0-9]+\s*:").expect("valid key prefix pattern"));

/// Canonical form used for every join-key comparison: NFC composition, then trim.
///
/// Idempotent: `normalize_identifier(&normalize_identifier(s)) == normalize_identifier(s)`.
pub fn normalize_identifier(s: &str) -> String {
    let composed: String = s.nfc().collect();
    composed.trim().to_string()
}

/// Trimmed, lowercased form used for task-id and parent-reference matching.
pub fn normalize_lower(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Same as [`normalize_lower`] but maps an absent value to the empty string.
pub fn normalize_lower_opt(s: Option<&str>) -> String {
    s.map(normalize_lower).unwrap_or_default()
}

/// True when a parent reference denotes "no parent".
pub fn is_no_parent(parent: Option<&str>) -> bool {
    let normalized = normalize_lower_opt(parent);
    NO_PARENT_SENTINELS.contains(&normalized.as_str())
}

/// Remove HTML tags and decode character entities, keeping only visible text.
///
/// `None` passes through unchanged.
pub fn strip_markup(text: Option<&str>) -> Option<String> {
    let text = text?;
    let without_tags = TAG_RE.replace_all(text, "");
    let decoded = ENTITY_RE.replace_all(&without_tags, |caps: &Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    Some(decoded.into_owned())
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "rsquo" => '\u{2019}',
        "lsquo" => '\u{2018}',
        "rdquo" => '\u{201d}',
        "ldquo" => '\u{201c}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        "rupee" => '\u{20b9}',
        _ => return None,
    };
    Some(ch.to_string())
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Parse a date in any of the common export formats.
///
/// Returns `None` for the "not recorded" sentinel, blank text, or anything
/// unparseable. Month-first is tried before day-first for slash dates.
pub fn parse_date_tolerant(text: &str, not_recorded: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(not_recorded) {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Drop a leading positional index such as `"0:"` from a key string.
///
/// Keys without such a prefix are returned trimmed but otherwise intact.
pub fn strip_key_prefix(key: &str) -> String {
    match KEY_PREFIX_RE.find(key) {
        Some(m) => key[m.end()..].trim().to_string(),
        None => key.trim().to_string(),
    }
}
