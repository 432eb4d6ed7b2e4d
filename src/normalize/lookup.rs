//! First-match-wins field resolution over raw JSON records.
//!
//! Every canonical field is described by an ordered slice of candidate keys.
//! A candidate wins when it is present, truthy and convertible to the target
//! type; otherwise the next one is tried, and the caller's default applies
//! when none match. Keys may be dotted paths (`channel.id`) into nested
//! objects.

use serde_json::Value;

/// Loose truthiness of a JSON value.
///
/// `null`, `false`, `0` and `""` are falsy. Arrays and objects are truthy
/// even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Walk a dotted path. Non-object intermediates resolve to `None`.
pub fn get_path<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(raw, |node, segment| node.as_object()?.get(segment))
}

/// First truthy value among `keys`, regardless of its type.
pub fn first_truthy<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| get_path(raw, key))
        .find(|value| is_truthy(value))
}

/// Scalar to string. Arrays and objects have no text form.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings to `i64`; fractional numbers are truncated.
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn opt_text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| get_path(raw, key))
        .filter(|value| is_truthy(value))
        .find_map(as_text)
}

pub fn text(raw: &Value, keys: &[&str], default: &str) -> String {
    opt_text(raw, keys).unwrap_or_else(|| default.to_string())
}

pub fn opt_int(raw: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| get_path(raw, key))
        .filter(|value| is_truthy(value))
        .find_map(as_int)
}

pub fn int(raw: &Value, keys: &[&str], default: i64) -> i64 {
    opt_int(raw, keys).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness_matches_loose_semantics() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!(-1)));
    }

    #[test]
    fn test_get_path_nested() {
        let raw = json!({"channel": {"id": 9, "name": "Nasional"}});
        assert_eq!(get_path(&raw, "channel.id"), Some(&json!(9)));
        assert_eq!(get_path(&raw, "channel.slug"), None);
        assert_eq!(get_path(&raw, "channel.id.deeper"), None);
    }

    #[test]
    fn test_first_match_skips_falsy_candidates() {
        let raw = json!({"title": "", "judul": "Judul Lama"});
        assert_eq!(text(&raw, &["title", "judul"], ""), "Judul Lama");
    }

    #[test]
    fn test_first_match_prefers_earlier_key() {
        let raw = json!({"title": "Modern", "judul": "Legacy"});
        assert_eq!(text(&raw, &["title", "judul"], ""), "Modern");
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let raw = json!({"other": 1});
        assert_eq!(text(&raw, &["nama", "name"], "Umum"), "Umum");
        assert_eq!(int(&raw, &["id"], 0), 0);
    }

    #[test]
    fn test_int_accepts_numeric_strings() {
        let raw = json!({"id_berita": " 42 ", "views": 12.9});
        assert_eq!(int(&raw, &["id", "id_berita"], 0), 42);
        assert_eq!(int(&raw, &["views"], 0), 12);
    }

    #[test]
    fn test_unconvertible_candidate_falls_through() {
        let raw = json!({"id": "abc", "id_berita": 7});
        assert_eq!(int(&raw, &["id", "id_berita"], 0), 7);

        let raw = json!({"title": {"rendered": "x"}, "judul": "Teks"});
        assert_eq!(text(&raw, &["title", "judul"], ""), "Teks");
    }

    #[test]
    fn test_non_object_record_yields_defaults() {
        let raw = json!("not a record");
        assert_eq!(text(&raw, &["title"], "fallback"), "fallback");
        assert!(first_truthy(&raw, &["title"]).is_none());
    }
}
