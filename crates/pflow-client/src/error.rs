//! API error types.
//!
//! Every failed call resolves to exactly one [`ApiError`]. The classified
//! variants carry the message that was shown to the user together with the
//! [`Cause`] that produced it, so call sites can still inspect the raw
//! status, envelope or transport error.

use pflow_store::StoreError;
use reqwest::StatusCode;
use thiserror::Error;

/// A result type using `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// User-visible messages emitted by the request pipeline.
pub mod messages {
    /// Fallback when the server sent no usable message.
    pub const REQUEST_FAILED: &str = "Request failed";
    /// Transport-level 401.
    pub const SESSION_EXPIRED: &str = "Your session has expired, please log in again";
    /// Transport-level 403.
    pub const FORBIDDEN: &str = "You do not have permission to perform this action";
    /// Transport-level 404.
    pub const NOT_FOUND: &str = "The requested resource does not exist";
    /// Transport-level 5xx.
    pub const SERVER_ERROR: &str = "Server error";
    /// No response was received.
    pub const NETWORK_ERROR: &str = "Network error, please check your connection";
}

/// The underlying signal a classified error was derived from.
#[derive(Debug, Error)]
pub enum Cause {
    /// A successful transport response whose envelope reported failure.
    #[error("envelope code {code}: {message}")]
    Envelope {
        /// Envelope `code`.
        code: i64,
        /// Envelope `message` as sent.
        message: String,
    },

    /// A non-success HTTP status.
    #[error("HTTP {status}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The response body, if one was sent.
        body: Option<String>,
    },

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("invalid body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Errors surfaced by the request pipeline and the auth layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server says the session is no longer valid (envelope or HTTP 401).
    #[error("{message}")]
    Authentication {
        /// Message shown to the user.
        message: String,
        /// What triggered the failure.
        #[source]
        cause: Cause,
    },

    /// Valid session, insufficient privilege (HTTP or envelope 403).
    #[error("{message}")]
    Authorization {
        /// Message shown to the user.
        message: String,
        /// What triggered the failure.
        #[source]
        cause: Cause,
    },

    /// The resource does not exist (HTTP or envelope 404).
    #[error("{message}")]
    NotFound {
        /// Message shown to the user.
        message: String,
        /// What triggered the failure.
        #[source]
        cause: Cause,
    },

    /// The server failed (HTTP or envelope 5xx).
    #[error("{message}")]
    Server {
        /// Message shown to the user.
        message: String,
        /// What triggered the failure.
        #[source]
        cause: Cause,
    },

    /// Any other rejection, usually carrying a server-supplied message.
    #[error("{message}")]
    Validation {
        /// Message shown to the user.
        message: String,
        /// What triggered the failure.
        #[source]
        cause: Cause,
    },

    /// No response was received.
    #[error("{message}")]
    Network {
        /// Message shown to the user.
        message: String,
        /// The transport error.
        #[source]
        cause: Cause,
    },

    /// A success response that is not a well-formed envelope, or whose
    /// `data` does not have the expected shape.
    #[error("{message}")]
    Decode {
        /// Message shown to the user.
        message: String,
        /// The decoding error.
        #[source]
        cause: Cause,
    },

    /// The outgoing request could not be constructed.
    #[error("failed to build request: {0}")]
    Request(#[source] reqwest::Error),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The session could not be persisted.
    #[error("session storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// A stable, machine-readable name for this kind of error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "authentication",
            Self::Authorization { .. } => "authorization",
            Self::NotFound { .. } => "not_found",
            Self::Server { .. } => "server",
            Self::Validation { .. } => "validation",
            Self::Network { .. } => "network",
            Self::Decode { .. } => "decode",
            Self::Request(_) => "request",
            Self::Encode(_) => "encode",
            Self::Storage(_) => "storage",
        }
    }

    /// Returns `true` for the one error kind that ends the session.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// The underlying cause of a classified error.
    #[must_use]
    pub const fn cause(&self) -> Option<&Cause> {
        match self {
            Self::Authentication { cause, .. }
            | Self::Authorization { cause, .. }
            | Self::NotFound { cause, .. }
            | Self::Server { cause, .. }
            | Self::Validation { cause, .. }
            | Self::Network { cause, .. }
            | Self::Decode { cause, .. } => Some(cause),
            Self::Request(_) | Self::Encode(_) | Self::Storage(_) => None,
        }
    }

    /// The HTTP status, when the failure came from one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self.cause()? {
            Cause::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The envelope code, when the failure came from one.
    #[must_use]
    pub fn envelope_code(&self) -> Option<i64> {
        match self.cause()? {
            Cause::Envelope { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Classify a failed envelope.
    ///
    /// The message is the server's, or [`messages::REQUEST_FAILED`] when it
    /// sent none.
    #[must_use]
    pub fn from_envelope(code: i64, message: &str) -> Self {
        let shown = if message.is_empty() {
            messages::REQUEST_FAILED.to_string()
        } else {
            message.to_string()
        };
        let cause = Cause::Envelope {
            code,
            message: message.to_string(),
        };

        match code {
            401 => Self::Authentication {
                message: shown,
                cause,
            },
            403 => Self::Authorization {
                message: shown,
                cause,
            },
            404 => Self::NotFound {
                message: shown,
                cause,
            },
            500..=599 => Self::Server {
                message: shown,
                cause,
            },
            _ => Self::Validation {
                message: shown,
                cause,
            },
        }
    }

    /// Classify a non-success HTTP status.
    ///
    /// Statuses without a fixed message use the `message` field of a JSON
    /// body when present.
    #[must_use]
    pub fn from_status(status: StatusCode, body: Option<String>) -> Self {
        let cause_of = |body| Cause::Status { status, body };

        match status.as_u16() {
            401 => Self::Authentication {
                message: messages::SESSION_EXPIRED.to_string(),
                cause: cause_of(body),
            },
            403 => Self::Authorization {
                message: messages::FORBIDDEN.to_string(),
                cause: cause_of(body),
            },
            404 => Self::NotFound {
                message: messages::NOT_FOUND.to_string(),
                cause: cause_of(body),
            },
            500..=599 => Self::Server {
                message: messages::SERVER_ERROR.to_string(),
                cause: cause_of(body),
            },
            _ => {
                let message = body
                    .as_deref()
                    .and_then(server_message)
                    .unwrap_or_else(|| messages::REQUEST_FAILED.to_string());
                Self::Validation {
                    message,
                    cause: cause_of(body),
                }
            }
        }
    }

    /// Classify a transport failure (no response received).
    #[must_use]
    pub fn from_transport(err: reqwest::Error) -> Self {
        Self::Network {
            message: messages::NETWORK_ERROR.to_string(),
            cause: Cause::Transport(err),
        }
    }

    /// Classify a body that could not be decoded.
    #[must_use]
    pub fn from_decode(err: serde_json::Error) -> Self {
        Self::Decode {
            message: messages::REQUEST_FAILED.to_string(),
            cause: Cause::Body(err),
        }
    }
}

/// Pull a non-empty `message` string out of a JSON error body.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
