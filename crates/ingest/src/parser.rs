use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracker_core::{TokenCounts, UsageEvent, session_id_from_path};
use tracker_db::format_timestamp;

const ASSISTANT_RECORD: &str = "assistant";
const UNKNOWN_MODEL: &str = "unknown";

/// One decoded log line together with the file it came from.
#[derive(Debug, Clone)]
pub struct RawRecord<'a> {
    pub path: &'a Path,
    pub value: Value,
}

/// Decodes one line into a JSON object. Blank lines, malformed JSON and
/// non-object values yield `None`.
pub fn parse_record_line(line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(line) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

/// Projects a raw record onto a usage event. Only assistant records carrying
/// a non-empty `message.usage` object and a parseable timestamp qualify.
pub fn usage_event_from_record(record: &RawRecord<'_>) -> Option<UsageEvent> {
    let value = &record.value;
    if value.get("type").and_then(Value::as_str) != Some(ASSISTANT_RECORD) {
        return None;
    }
    let message = value.get("message")?.as_object()?;
    let usage = message.get("usage")?.as_object()?;
    if usage.is_empty() {
        return None;
    }
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(normalize_timestamp)?;
    let model = message
        .get("model")
        .and_then(Value::as_str)
        .filter(|model| !model.is_empty())
        .unwrap_or(UNKNOWN_MODEL);

    let count = |key: &str| usage.get(key).and_then(Value::as_u64).unwrap_or(0);
    Some(UsageEvent {
        timestamp,
        session_id: session_id_from_path(record.path),
        model: model.to_string(),
        tokens: TokenCounts {
            input_tokens: count("input_tokens"),
            output_tokens: count("output_tokens"),
            cache_creation_tokens: count("cache_creation_input_tokens"),
            cache_read_tokens: count("cache_read_input_tokens"),
        },
    })
}

pub fn usage_event_from_line(path: &Path, line: &str) -> Option<UsageEvent> {
    let value = parse_record_line(line)?;
    usage_event_from_record(&RawRecord { path, value })
}

/// Normalizes a source timestamp to the store's canonical UTC form.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_timestamp(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(format_timestamp(DateTime::<Utc>::from_naive_utc_and_offset(
                parsed, Utc,
            )));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/home/me/.claude/projects/demo/3f2a9c1e.jsonl";

    fn parse(line: &str) -> Option<UsageEvent> {
        usage_event_from_line(Path::new(PATH), line)
    }

    #[test]
    fn parses_assistant_usage_line() {
        let line = r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00.123Z","sessionId":"ignored","message":{"model":"claude-sonnet-4","usage":{"input_tokens":12,"output_tokens":340,"cache_creation_input_tokens":1000,"cache_read_input_tokens":20000}}}"#;
        let event = parse(line).expect("event");
        assert_eq!(event.timestamp, "2025-06-01T10:00:00.123Z");
        assert_eq!(event.session_id, "3f2a9c1e");
        assert_eq!(event.model, "claude-sonnet-4");
        assert_eq!(event.tokens.input_tokens, 12);
        assert_eq!(event.tokens.output_tokens, 340);
        assert_eq!(event.tokens.cache_creation_tokens, 1000);
        assert_eq!(event.tokens.cache_read_tokens, 20000);
    }

    #[test]
    fn missing_counts_default_to_zero_and_model_to_unknown() {
        let line = r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","message":{"usage":{"output_tokens":5}}}"#;
        let event = parse(line).expect("event");
        assert_eq!(event.model, "unknown");
        assert_eq!(event.tokens.input_tokens, 0);
        assert_eq!(event.tokens.output_tokens, 5);
        assert_eq!(event.tokens.total(), 5);
    }

    #[test]
    fn timestamps_are_normalized_to_utc_millis() {
        let line = r#"{"type":"assistant","timestamp":"2025-06-01T12:00:00+02:00","message":{"usage":{"input_tokens":1}}}"#;
        assert_eq!(parse(line).expect("event").timestamp, "2025-06-01T10:00:00.000Z");
        assert_eq!(
            normalize_timestamp("2025-06-01T10:00:00.5").as_deref(),
            Some("2025-06-01T10:00:00.500Z")
        );
        assert_eq!(normalize_timestamp("yesterday"), None);
    }

    #[test]
    fn non_candidates_yield_no_event() {
        let cases = [
            "",
            "   ",
            "not json",
            "{\"type\":\"assistant\"",
            "[1,2,3]",
            r#"{"type":"user","timestamp":"2025-06-01T10:00:00Z","message":{"usage":{"input_tokens":1}}}"#,
            r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","message":{"model":"m"}}"#,
            r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","message":{"usage":{}}}"#,
            r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","message":"text"}"#,
            r#"{"type":"assistant","message":{"usage":{"input_tokens":1}}}"#,
            r#"{"type":"assistant","timestamp":"","message":{"usage":{"input_tokens":1}}}"#,
        ];
        for line in cases {
            assert!(parse(line).is_none(), "expected no event for {line:?}");
        }
    }

    #[test]
    fn wrongly_typed_counts_are_treated_as_missing() {
        let line = r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","message":{"usage":{"input_tokens":"12","output_tokens":-3,"cache_read_input_tokens":7}}}"#;
        let event = parse(line).expect("event");
        assert_eq!(event.tokens.input_tokens, 0);
        assert_eq!(event.tokens.output_tokens, 0);
        assert_eq!(event.tokens.cache_read_tokens, 7);
    }

    #[test]
    fn parse_record_line_keeps_non_usage_objects() {
        let value = parse_record_line(r#"{"type":"summary","summary":"x"}"#).expect("object");
        assert_eq!(value["type"], "summary");
    }
}
