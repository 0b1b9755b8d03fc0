//! Turns an arbitrary failed API response into one user-presentable string.

use serde_json::Value;

/// Renders the most specific message available from a failed response body.
///
/// Priority: structured `detail.error_code` + `detail.message`, then a plain
/// string `detail`, then a top-level `message`, then an `HTTP_<status>`
/// fallback. Always returns a non-empty string, even for an empty or
/// non-JSON body.
pub fn classify_api_error(status: u16, status_text: Option<&str>, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = payload.get("detail") {
            if let (Some(code), Some(message)) = (
                detail.get("error_code").and_then(Value::as_str),
                detail.get("message").and_then(Value::as_str),
            ) {
                return format!("{}: {}", code, message);
            }
            if let Some(text) = detail.as_str() {
                return text.to_string();
            }
        }
        if let Some(message) = payload.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    let reason = match status_text {
        Some(text) if !text.is_empty() => text,
        _ => "Request failed",
    };
    format!("HTTP_{}: {}", status, reason)
}
