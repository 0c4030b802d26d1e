//! Request and response payloads for the remote completions endpoint,
//! plus shared formatting for API error bodies.

use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: Vec<String>,
}

#[derive(Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

#[derive(Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// Collapse an arbitrary error body into a single diagnostic string.
///
/// JSON bodies are summarized from their `error.message` field when present;
/// anything else is passed through verbatim.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API error: <empty>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return format!("API error: {summary}");
            }
        }
    }

    format!("API error: {trimmed}")
}
