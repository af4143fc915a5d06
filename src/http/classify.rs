//! Classification of vendor responses
//!
//! A vendor error envelope is a JSON object with a non-empty `errors` array.
//! It wins over the HTTP status, including on 200 responses.

use super::client::Outcome;
use crate::error::{Error, Result};
use serde_json::Value;
use tracing::warn;

/// Longest body excerpt kept on a rejected request
const MAX_BODY_EXCERPT: usize = 1024;

/// Turn one completed exchange into a parsed body or a categorized error
pub fn classify(outcome: Outcome) -> Result<Value> {
    let Outcome { status, body } = outcome;
    let parsed = serde_json::from_str::<Value>(&body).ok();

    if let Some((code, message)) = parsed.as_ref().and_then(|v| vendor_error(v, status)) {
        warn!("Vendor error {} (HTTP {}): {}", code, status, message);
        return Err(Error::failed(code, message));
    }

    if !(200..300).contains(&status) {
        return Err(Error::rejected(status, excerpt(&body)));
    }

    parsed.ok_or_else(|| Error::invalid_response(format!("HTTP {status} body is not JSON")))
}

/// Code and message of the first error in a vendor envelope
fn vendor_error(body: &Value, status: u16) -> Option<(String, String)> {
    let errors = body.get("errors")?.as_array()?;
    let first = errors.first()?;

    let code = first
        .get("code")
        .and_then(code_string)
        .or_else(|| {
            first
                .get("extensions")
                .and_then(|ext| ext.get("code"))
                .and_then(code_string)
        })
        .unwrap_or_else(|| status.to_string());

    let messages: Vec<String> = errors
        .iter()
        .map(|e| match e.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => e.to_string(),
        })
        .collect();

    Some((code, messages.join("; ")))
}

fn code_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
