use std::sync::{Arc, OnceLock};

static HTTP_CLIENT_INSTANCE: OnceLock<Arc<dyn LoyaltyHttpClient>> = OnceLock::new();

/// HTTP transport that native applications implement for the SDK.
///
/// The SDK builds the absolute URL, every header (including authentication) and the body; the
/// native side only performs the exchange through its own networking stack (OkHttp,
/// `URLSession`), so certificate pinning, proxies and timeouts stay under app control.
///
/// Implementations must report any non-2xx response as [`HttpError::BadStatusCode`] and include
/// the response body, which carries the platform's error envelope.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait LoyaltyHttpClient: Send + Sync {
    /// Performs one request and returns the raw response body.
    ///
    /// # Arguments
    /// * `url` - Absolute URL including the query string
    /// * `method` - HTTP method
    /// * `headers` - Headers to send verbatim
    /// * `body` - Request body, already encoded
    ///
    /// # Errors
    /// * `HttpError::BadStatusCode` - For 4xx/5xx responses, with the response body
    /// * `HttpError::NoConnectivity` - When the device is offline
    /// * `HttpError::Timeout` - When the request times out
    /// * `HttpError::Cancelled` - When the request is cancelled
    /// * `HttpError::Generic` - For anything else
    async fn fetch(
        &self,
        url: String,
        method: HttpMethod,
        headers: Vec<HttpHeader>,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, HttpError>;
}

/// HTTP methods used by the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

/// A single request header.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct HttpHeader {
    /// Header name
    pub name: String,
    /// Header value
    pub value: String,
}

impl HttpHeader {
    /// Builds a header from anything string-like.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Transport-level failures reported by the native HTTP client.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HttpError {
    /// The server answered with a 4xx or 5xx status.
    #[error("Bad status code {code}")]
    BadStatusCode {
        /// The HTTP status code
        code: u64,
        /// The response body, usually the platform's error envelope
        response_body: Vec<u8>,
    },
    /// The device has no connectivity.
    #[error("No internet connectivity")]
    NoConnectivity,
    /// The request timed out.
    #[error("Request timed out after {seconds} seconds")]
    Timeout {
        /// Seconds elapsed before the timeout
        seconds: u64,
    },
    /// The request was cancelled before completion.
    #[error("Request was cancelled")]
    Cancelled,
    /// Anything else.
    #[error("HTTP error: {message}")]
    Generic {
        /// Description of the failure
        message: String,
    },
}

/// Foreign implementations that throw something unexpected land here instead of panicking.
impl From<uniffi::UnexpectedUniFFICallbackError> for HttpError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Generic {
            message: error.reason,
        }
    }
}

/// Registers the native HTTP client. Returns `false` if one was already registered.
#[uniffi::export]
pub fn set_http_client(client: Arc<dyn LoyaltyHttpClient>) -> bool {
    let installed = HTTP_CLIENT_INSTANCE.set(client).is_ok();
    if !installed {
        crate::warn!("HTTP client already set, ignoring");
    }
    installed
}

/// Returns whether a native HTTP client has been registered.
#[uniffi::export]
#[must_use]
pub fn is_http_client_initialized() -> bool {
    HTTP_CLIENT_INSTANCE.get().is_some()
}

/// Gets the registered native HTTP client.
#[must_use]
pub fn get_http_client() -> Option<Arc<dyn LoyaltyHttpClient>> {
    HTTP_CLIENT_INSTANCE.get().cloned()
}
