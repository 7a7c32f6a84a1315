//! Error types shared by every use case.
//!
//! Operations return [`UseCaseError`]. Callback-style operations deliver an [`ApiError`], the
//! flat `(code, id, message)` triple apps branch on. Platform failures keep the server's code
//! and id; failures that never reached the platform use the negative codes in [`codes`].

use serde::Deserialize;

use crate::primitives::http_client::HttpError;
use crate::primitives::key_value_store::KeyValueStoreError;

/// Codes for failures that happen on the device.
pub mod codes {
    /// The request could not be completed (offline, timeout, cancelled).
    pub const NETWORK: i64 = -1;
    /// The response could not be decoded.
    pub const DECODE: i64 = -2;
    /// An argument was rejected before sending.
    pub const INVALID_ARGUMENT: i64 = -3;
    /// The device key-value store failed.
    pub const STORAGE: i64 = -4;
    /// The SDK is missing its configuration or HTTP client.
    pub const SDK_NOT_READY: i64 = -5;
    /// Anything else.
    pub const GENERIC: i64 = -6;
    /// A required token is not stored. Same as the platform's HTTP status.
    pub const UNAUTHORIZED: i64 = 401;
}

/// Errors returned by use-case operations.
#[crate::loyalty_error(structured)]
pub enum UseCaseError {
    /// The platform rejected the request.
    #[error("API error {code}: {message}")]
    Api {
        /// Platform error code, or the HTTP status when the body has none
        code: i64,
        /// Platform error id, when provided
        id: Option<String>,
        /// Human readable message from the platform
        message: String,
    },
    /// `set_http_client` has not been called.
    #[error("HTTP client not initialized. Call set_http_client() first.")]
    HttpClientNotInitialized,
    /// `init_sdk_config` has not been called.
    #[error("SDK config not initialized. Call init_sdk_config() first.")]
    ConfigNotInitialized,
    /// The request needs a token that is not stored.
    #[error("not authenticated: no {token} stored")]
    NotAuthenticated {
        /// Name of the missing token
        token: String,
    },
    /// The request did not complete.
    #[error("network error: {message}")]
    Network {
        /// Transport error description
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Decoder error description
        message: String,
    },
    /// An argument was rejected before sending.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong
        message: String,
    },
    /// The device key-value store failed.
    #[error("storage error: {message}")]
    Storage {
        /// Store error description
        message: String,
    },
}

impl UseCaseError {
    /// Whether the failure means the session is missing or no longer valid.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::NotAuthenticated { .. } => true,
            Self::Api { code, .. } => *code == codes::UNAUTHORIZED,
            _ => false,
        }
    }

    /// Builds the error for a non-2xx response.
    pub(crate) fn from_response(status: u64, body: &[u8]) -> Self {
        let status = i64::try_from(status).unwrap_or(i64::MAX);
        if let Some(envelope) = ErrorEnvelope::parse(body) {
            return envelope.into_error(status);
        }

        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        let message = if text.is_empty() {
            format!("HTTP {status}")
        } else {
            text.chars().take(MAX_FALLBACK_MESSAGE_CHARS).collect()
        };
        Self::Api {
            code: status,
            id: None,
            message,
        }
    }

    /// Detects an error envelope inside a 2xx response.
    pub(crate) fn from_success_body(body: &[u8]) -> Option<Self> {
        ErrorEnvelope::parse(body)
            .filter(|envelope| !envelope.is_empty())
            .map(|envelope| envelope.into_error(200))
    }
}

const MAX_FALLBACK_MESSAGE_CHARS: usize = 200;

/// `{"error": {"code": 409, "id": "1905", "message": "..."}}`
#[derive(Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "Code")]
    code: Option<i64>,
    #[serde(default, alias = "Id", alias = "ID")]
    id: Option<serde_json::Value>,
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

impl ErrorEnvelope {
    /// Only a top-level object whose `error` member is an object counts as an envelope.
    fn parse(body: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        let error = value.as_object()?.get("error")?;
        if !error.is_object() {
            return None;
        }
        let error: ErrorBody = serde_json::from_value(error.clone()).ok()?;
        Some(Self { error })
    }

    fn is_empty(&self) -> bool {
        self.error.code.is_none() && self.error.message.is_none()
    }

    fn into_error(self, status: i64) -> UseCaseError {
        let ErrorBody { code, id, message } = self.error;
        let id = id.and_then(|id| match id {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        UseCaseError::Api {
            code: code.unwrap_or(status),
            id,
            message: message.unwrap_or_else(|| format!("HTTP {status}")),
        }
    }
}

impl From<HttpError> for UseCaseError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::BadStatusCode {
                code,
                response_body,
            } => Self::from_response(code, &response_body),
            other => Self::Network {
                message: other.to_string(),
            },
        }
    }
}

impl From<KeyValueStoreError> for UseCaseError {
    fn from(e: KeyValueStoreError) -> Self {
        Self::Storage {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for UseCaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode {
            message: e.to_string(),
        }
    }
}

/// The `(code, id, message)` shape apps branch on.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ApiError {
    /// Platform error code, HTTP status, or a negative local code
    pub code: i64,
    /// Platform error id, or a short local identifier
    pub id: Option<String>,
    /// Human readable message
    pub message: String,
}

impl From<&UseCaseError> for ApiError {
    fn from(error: &UseCaseError) -> Self {
        let (code, id) = match error {
            UseCaseError::Api { code, id, message } => {
                return Self {
                    code: *code,
                    id: id.clone(),
                    message: message.clone(),
                };
            }
            UseCaseError::HttpClientNotInitialized | UseCaseError::ConfigNotInitialized => {
                (codes::SDK_NOT_READY, "sdk_not_ready")
            }
            UseCaseError::NotAuthenticated { .. } => (codes::UNAUTHORIZED, "not_authenticated"),
            UseCaseError::Network { .. } => (codes::NETWORK, "network"),
            UseCaseError::Decode { .. } => (codes::DECODE, "decode"),
            UseCaseError::InvalidArgument { .. } => (codes::INVALID_ARGUMENT, "invalid_argument"),
            UseCaseError::Storage { .. } => (codes::STORAGE, "storage"),
            UseCaseError::Generic { .. } => (codes::GENERIC, "generic"),
        };
        Self {
            code,
            id: Some(id.to_string()),
            message: error.to_string(),
        }
    }
}

impl From<UseCaseError> for ApiError {
    fn from(error: UseCaseError) -> Self {
        Self::from(&error)
    }
}
