//! Feedback Parser: turns raw model output into structured answer feedback.
//!
//! Model output is expected to hold a JSON object, possibly fenced in markdown
//! or surrounded by prose. Parsing never fails: anything unusable comes back as
//! `FeedbackResult::Raw` carrying the original text.

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// The numeric fields coerced and averaged by this module.
pub const SCORE_FIELDS: [&str; 3] = ["correctness", "clarity", "confidence"];

/// Parsed evaluation feedback.
///
/// Serialized untagged: either the structured object itself, or `{"raw": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedbackResult {
    Raw { raw: String },
    Structured(Map<String, Value>),
}

impl FeedbackResult {
    pub fn is_structured(&self) -> bool {
        matches!(self, FeedbackResult::Structured(_))
    }

    /// A numeric score field, when present and numeric.
    pub fn score(&self, field: &str) -> Option<f64> {
        match self {
            FeedbackResult::Structured(fields) => fields.get(field).and_then(Value::as_f64),
            FeedbackResult::Raw { .. } => None,
        }
    }

    pub fn overall_feedback(&self) -> Option<&str> {
        match self {
            FeedbackResult::Structured(fields) => {
                fields.get("overall_feedback").and_then(Value::as_str)
            }
            FeedbackResult::Raw { .. } => None,
        }
    }

    /// `calculate_safe_score` over the structured fields; 0 for raw feedback.
    pub fn safe_score(&self) -> f64 {
        match self {
            FeedbackResult::Structured(fields) => calculate_safe_score(fields),
            FeedbackResult::Raw { .. } => 0.0,
        }
    }
}

/// Parses model output into feedback. Never panics, never errors.
pub fn parse_feedback(text: &str) -> FeedbackResult {
    match decode_object(text) {
        Ok(mut fields) => {
            for field in SCORE_FIELDS {
                if let Some(value) = fields.get_mut(field) {
                    *value = coerce_number(value);
                }
            }
            FeedbackResult::Structured(fields)
        }
        Err(()) => FeedbackResult::Raw {
            raw: text.to_string(),
        },
    }
}

/// Mean of whichever score fields are present and numeric, rounded to 2 decimals.
/// Returns 0 when none qualify.
pub fn calculate_safe_score(fields: &Map<String, Value>) -> f64 {
    let scores: Vec<f64> = SCORE_FIELDS
        .iter()
        .filter_map(|f| fields.get(*f))
        .filter(|v| v.is_number())
        .filter_map(Value::as_f64)
        .filter(|s| s.is_finite())
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 100.0).round() / 100.0
}

fn decode_object(text: &str) -> Result<Map<String, Value>, ()> {
    let cleaned = strip_fences(text);
    let cleaned = cleaned.trim();

    let candidate = if cleaned.starts_with('{') && cleaned.ends_with('}') {
        cleaned
    } else {
        outermost_braces(cleaned).unwrap_or(cleaned)
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(()),
    }
}

/// Removes a leading ```json marker (any case) and every remaining ``` marker.
fn strip_fences(text: &str) -> String {
    let trimmed = text.trim_start();
    let without_tag = match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("```json") => &trimmed[7..],
        _ => trimmed,
    };
    without_tag.replace("```", "")
}

/// First `{` through last `}`, if both exist in that order.
fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn coerce_number(value: &Value) -> Value {
    let number = match value {
        Value::Number(_) => return value.clone(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
