//! Caption records and their display text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields checked, in order, for a record's human-readable caption.
pub const CAPTION_TEXT_FIELDS: &[&str] = &["caption", "text", "content", "body", "caption_text"];

/// A single generated caption as returned by the backend.
///
/// The backend's record schema is open-ended, so the raw JSON is kept intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionRecord(pub Value);

impl CaptionRecord {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// The first checked field holding non-blank text, else the record as
    /// compact JSON.
    pub fn display_text(&self) -> String {
        if let Value::Object(map) = &self.0 {
            for key in CAPTION_TEXT_FIELDS {
                if let Some(Value::String(s)) = map.get(*key) {
                    if !s.trim().is_empty() {
                        return s.clone();
                    }
                }
            }
        }
        self.0.to_string()
    }
}

/// Normalize a caption response body into a list of records.
///
/// Accepts a bare array or an object with a `captions` array; any other
/// shape yields an empty list.
pub fn normalize_captions(body: Option<&Value>) -> Vec<CaptionRecord> {
    let list = match body {
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => match map.get("captions") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    list.iter().cloned().map(CaptionRecord).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_text_field_order() {
        let record = CaptionRecord(json!({"text": "second", "caption": "first"}));
        assert_eq!(record.display_text(), "first");

        let record = CaptionRecord(json!({"caption_text": "last resort"}));
        assert_eq!(record.display_text(), "last resort");
    }

    #[test]
    fn test_display_text_skips_blank_and_non_string() {
        let record = CaptionRecord(json!({"caption": "   ", "text": 42, "content": "real"}));
        assert_eq!(record.display_text(), "real");
    }

    #[test]
    fn test_display_text_is_not_trimmed() {
        let record = CaptionRecord(json!({"caption": " padded "}));
        assert_eq!(record.display_text(), " padded ");
    }

    #[test]
    fn test_display_text_falls_back_to_json() {
        let record = CaptionRecord(json!({"unrelated": 1}));
        assert_eq!(record.display_text(), r#"{"unrelated":1}"#);

        let scalar = CaptionRecord(json!("bare string"));
        assert_eq!(scalar.display_text(), r#""bare string""#);
    }

    #[test]
    fn test_normalize_wrapped_list() {
        let body = json!({"captions": [{"caption": "a dog"}]});
        let records = normalize_captions(Some(&body));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_text(), "a dog");
    }

    #[test]
    fn test_normalize_bare_list() {
        let body = json!([{"text": "a cat"}, {"unrelated": 1}]);
        let texts: Vec<String> = normalize_captions(Some(&body))
            .iter()
            .map(CaptionRecord::display_text)
            .collect();
        assert_eq!(texts, vec!["a cat".to_string(), r#"{"unrelated":1}"#.to_string()]);
    }

    #[test]
    fn test_normalize_unrecognized_shapes_are_empty() {
        assert!(normalize_captions(None).is_empty());
        assert!(normalize_captions(Some(&json!({"captions": "nope"}))).is_empty());
        assert!(normalize_captions(Some(&json!({"other": []}))).is_empty());
        assert!(normalize_captions(Some(&json!(7))).is_empty());
    }
}
