//! Turning non-2xx responses into errors.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::AdminError;
use crate::types::GENERIC_FAILURE_MESSAGE;

/// Pull a human-readable `message` out of an error body, if the server sent one
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Build the error for a rejected request from its status and raw body
pub fn api_error(status: StatusCode, body: &str) -> AdminError {
    AdminError::Api {
        status: status.as_u16(),
        message: extract_error_message(body)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
    }
}
