//! Lenient response bodies.
//!
//! A body that is not valid JSON is kept as raw text instead of raising, so a
//! failed step can report what the server actually said.

use serde_json::Value;

/// Longest body excerpt included in an error message.
const MAX_DETAIL_CHARS: usize = 300;

/// A response body parsed as far as it would go.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No body (or only whitespace)
    Empty,
    /// Valid JSON
    Json(Value),
    /// Anything else, verbatim
    Text(String),
}

impl ResponseBody {
    /// Parse body text, falling back to raw text on invalid JSON.
    pub fn parse(text: String) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Non-empty string field of a JSON object body.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.json()?
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Short human-readable rendering for error messages.
    pub fn describe(&self) -> String {
        let full = match self {
            Self::Empty => return "empty response body".to_string(),
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.trim().to_string(),
        };
        truncate(&full, MAX_DETAIL_CHARS)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
