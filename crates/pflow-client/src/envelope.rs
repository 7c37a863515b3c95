//! The response envelope every non-binary API call is wrapped in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ code, message, data }` as sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Application status code; `200` is success.
    pub code: i64,
    /// Human readable status message, may be empty.
    #[serde(default)]
    pub message: String,
    /// Payload.
    #[serde(default)]
    pub data: T,
}

impl<T> Envelope<T> {
    /// Success code.
    pub const SUCCESS: i64 = 200;

    /// The session is no longer valid.
    pub const UNAUTHORIZED: i64 = 401;

    /// Returns `true` if `code` is the success code.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }

    /// The message, or `None` when the server sent an empty one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        Some(self.message.as_str()).filter(|m| !m.is_empty())
    }
}
