//! The `{status, message, data}` wrapper around every backend response.

use serde::Deserialize;

use crate::error::{PmboardError, Result};

/// Status string the backend uses for plain success.
pub const STATUS_OK: &str = "OK";

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_ok_status(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }

    /// Present `data` is success regardless of `status`. A null `data` is a
    /// backend failure carrying `message`.
    pub fn into_result(self) -> Result<T> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(PmboardError::Backend(self.failure_message())),
        }
    }

    /// For endpoints whose success payload is empty: success if `data` is
    /// present or the status is `OK`.
    pub fn into_unit(self) -> Result<()> {
        if self.data.is_some() || self.is_ok_status() {
            return Ok(());
        }
        Err(PmboardError::Backend(self.failure_message()))
    }

    fn failure_message(&self) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => "The server returned no data".to_string(),
        }
    }
}

/// Pull a human-readable message out of an error response body: the
/// top-level `message`, else `error.message`, else a plain `error` string.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.get("message"),
        value.get("error").and_then(|e| e.get("message")),
        value.get("error"),
    ];
    // Bound so the borrow of `value` ends before it drops.
    #[allow(clippy::let_and_return)]
    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string);
    found
}
