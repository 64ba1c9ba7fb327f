//! Candidate source fields for every canonical course-card field.
//!
//! Upstream course records come from more than one catalogue version, so the
//! same fact can live under different keys (`course` vs `name`,
//! `competencies` vs `competencies_v6`). Every such list lives here and is
//! evaluated first-match by the resolvers below; supporting a new upstream
//! shape means editing one constant.
//!
//! A key whose value is JSON `null` counts as absent everywhere.

use serde_json::{Map, Number, Value};

/// Course title.
pub const TITLE: &[&str] = &["course", "name"];

/// Organisation list; its first element is the provider.
pub const ORGANISATION: &[&str] = &["organisation"];

/// Provider fallback when no organisation is listed.
pub const PLATFORM: &[&str] = &["platform"];

pub const RELEVANCY: &[&str] = &["relevancy"];

pub const IS_PUBLIC: &[&str] = &["is_public"];

/// Identifier matched against a plan's selected course identifiers.
pub const IDENTIFIER: &[&str] = &["identifier", "id", "course_id"];

/// Competency list; an empty list falls through to the next candidate.
pub const COMPETENCIES: &[&str] = &["competencies", "competencies_v6"];

// Keys inside one competency item. Role mappings use the short names, course
// records the `competency*Name` ones; some items carry both.

pub const COMPETENCY_THEME: &[&str] = &["theme", "competencyThemeName"];

pub const COMPETENCY_SUB_THEME: &[&str] = &["sub_theme", "competencySubThemeName"];

/// Free-text type (role mappings) or competency area (courses).
pub const COMPETENCY_TYPE: &[&str] = &["type", "competencyAreaName"];

/// Value under `key`, treating `null` as absent.
pub fn lookup<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

/// First candidate holding a non-empty string. Numbers are accepted and
/// stringified (identifiers are sometimes numeric).
pub fn first_text(record: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|key| lookup(record, key))
        .find_map(text_of)
}

/// First element of the first non-empty list among `candidates`, even when
/// that element is blank. A bare non-empty string is taken as a one-element
/// list. Only absent, `null` or empty candidates fall through.
pub fn first_listed(record: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|key| lookup(record, key))
        .find_map(|v| match v {
            Value::Array(items) => items.first().map(|first| text_of(first).unwrap_or_default()),
            other => text_of(other),
        })
}

/// First candidate holding a number, or a string that parses as one.
pub fn first_number(record: &Map<String, Value>, candidates: &[&str]) -> Option<Number> {
    candidates
        .iter()
        .filter_map(|key| lookup(record, key))
        .find_map(|v| match v {
            Value::Number(n) => Some(n.clone()),
            Value::String(s) => parse_number(s.trim()),
            _ => None,
        })
}

/// First candidate holding a boolean.
pub fn first_bool(record: &Map<String, Value>, candidates: &[&str]) -> Option<bool> {
    candidates
        .iter()
        .filter_map(|key| lookup(record, key))
        .find_map(Value::as_bool)
}

/// Resolve a multi-source field: the first candidate with a non-blank value
/// wins; failing that, the first candidate present at all (blank). `None`
/// only when every candidate is absent.
///
/// Returns the winning key with its value so callers can report which
/// source was used.
pub fn first_present<'a>(
    record: &'a Map<String, Value>,
    candidates: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    let mut blank = None;
    for &key in candidates {
        if let Some(v) = lookup(record, key) {
            if !is_blank(v) {
                return Some((key, v));
            }
            blank.get_or_insert((key, v));
        }
    }
    blank
}

/// Empty string, empty list, or empty object.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}
