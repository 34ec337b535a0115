use seo_scoring::AnalysisResult;
use serde_json::Value;
use thiserror::Error;

pub const REQUIRED_FIELDS: [&str; 6] = [
    "primaryKeywords",
    "secondaryKeywords",
    "tags",
    "metaDescriptions",
    "analysis",
    "recommendations",
];

#[derive(Debug, Error)]
pub enum AnalysisParseError {
    #[error("Model returned an empty response")]
    EmptyResponse,
    #[error("Failed to parse model response as JSON: {0}")]
    JsonError(String),
    #[error("Model response is not a JSON object")]
    NotAnObject,
    #[error("Model response is missing required fields: {0}")]
    MissingFields(String),
    #[error("Model response has unexpected field types: {0}")]
    ShapeError(String),
}

/// Locates the JSON payload in a model reply.
///
/// Prefers a fenced ```json block, then the span from the first `{` to the
/// last `}`, and otherwise returns the trimmed text unchanged.
pub fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let after_fence = &text[start + "```json".len()..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

pub fn missing_fields(value: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| value.get(field).is_none())
        .collect()
}

pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisParseError> {
    if text.trim().is_empty() {
        return Err(AnalysisParseError::EmptyResponse);
    }

    let value: Value = match serde_json::from_str(text.trim()) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(extract_json(text))
            .map_err(|e| AnalysisParseError::JsonError(e.to_string()))?,
    };

    if !value.is_object() {
        return Err(AnalysisParseError::NotAnObject);
    }

    let missing = missing_fields(&value);
    if !missing.is_empty() {
        return Err(AnalysisParseError::MissingFields(missing.join(", ")));
    }

    serde_json::from_value(value).map_err(|e| AnalysisParseError::ShapeError(e.to_string()))
}
