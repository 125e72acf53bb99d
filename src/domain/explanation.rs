use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

pub const SUMMARY_SECTION: &str = "summary";

/// An explanation that passed [`validate`]. Sections keep the key order of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplanationPayload {
    pub title: String,
    pub sections: IndexMap<String, Vec<String>>,
}

impl ExplanationPayload {
    pub fn summary(&self) -> &[String] {
        self.sections
            .get(SUMMARY_SECTION)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Shape guard for untrusted explanation text: a string `title`, an object
/// `sections`, and a non-empty `sections.summary` array. Other sections pass through.
pub fn validate(raw: &str) -> Result<ExplanationPayload, ValidationError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| ValidationError::MalformedPayload(err.to_string()))?;

    let object = value
        .as_object()
        .ok_or(ValidationError::MissingRequiredFields("explanation object"))?;
    let title = object
        .get("title")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingRequiredFields("title"))?;
    let sections = object
        .get("sections")
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingRequiredFields("sections"))?;

    match sections.get(SUMMARY_SECTION).and_then(Value::as_array) {
        Some(points) if !points.is_empty() => {}
        _ => {
            return Err(ValidationError::MissingRequiredFields("sections.summary"));
        }
    }

    Ok(ExplanationPayload {
        title: title.to_string(),
        sections: sections
            .iter()
            .map(|(name, value)| (name.clone(), section_points(value)))
            .collect(),
    })
}

fn section_points(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(point_text).collect(),
        other => vec![point_text(other)],
    }
}

fn point_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn compose_review_message(payload: &ExplanationPayload) -> String {
    let summary_points = payload
        .summary()
        .iter()
        .map(|point| format!("- {point}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Hi team! \n\
         \n\
         I've created a new PR that needs your review.\n\
         \n\
         Summary of changes {title}:\n\
         {summary_points}\n\
         \n\
         Would appreciate your review when you have a moment. Thanks!",
        title = payload.title,
    )
}
