//! Normalization of structured response documents into a [`ChatMessage`].
//!
//! Accepted shapes:
//! - object with `content` (or `text`), optional `id`, `role`, `timestamp`
//! - bare string
//! - array of objects, whose `content`/`text` fields are joined with `\n`
//! - any other scalar, stringified
//!
//! A body that is not valid JSON, or is `null`, becomes an empty assistant
//! message. Normalization never fails.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use crate::message::{ChatMessage, Role};

/// Normalize a raw response body.
#[must_use]
pub fn normalize_body(body: &[u8]) -> ChatMessage {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => normalize_value(&value),
        Err(e) => {
            warn!(error = %e, len = body.len(), "structured body failed to parse, using empty content");
            ChatMessage::assistant(String::new())
        }
    }
}

/// Normalize an already decoded document.
#[must_use]
pub fn normalize_value(value: &Value) -> ChatMessage {
    match value {
        Value::Null => ChatMessage::assistant(String::new()),
        Value::Object(object) => normalize_object(object),
        Value::String(text) => ChatMessage::assistant(text.clone()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(element_text)
                .collect::<Vec<_>>()
                .join("\n");
            ChatMessage::assistant(joined)
        }
        Value::Bool(_) | Value::Number(_) => ChatMessage::assistant(value.to_string()),
    }
}

fn normalize_object(object: &Map<String, Value>) -> ChatMessage {
    let mut message = ChatMessage::assistant(object_text(object));

    if let Some(id) = object.get("id").and_then(scalar_string)
        && !id.is_empty()
    {
        message.id = id;
    }
    if let Some(role) = object.get("role").and_then(Value::as_str).and_then(Role::parse) {
        message.role = role;
    }
    if let Some(timestamp) = object.get("timestamp").and_then(parse_timestamp) {
        message.timestamp = timestamp;
    }
    message
}

/// `content` when present and non-empty, otherwise `text`, otherwise empty.
fn object_text(object: &Map<String, Value>) -> String {
    ["content", "text"]
        .iter()
        .filter_map(|key| object.get(*key))
        .map(coerce_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Array elements only contribute their fields; anything that is not an
/// object has none and becomes an empty line.
fn element_text(element: &Value) -> String {
    match element {
        Value::Object(object) => object_text(object),
        _ => String::new(),
    }
}

/// Coerce a field value to text. `null` is empty; nested values are
/// serialized.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC), or
/// epoch milliseconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => {
            let raw = raw.trim();
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|naive| naive.and_utc())
                })
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}
