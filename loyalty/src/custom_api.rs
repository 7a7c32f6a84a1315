//! Escape hatch for platform endpoints without a dedicated use case.
//!
//! ```ignore
//! let body = CustomApiBuilder::new(auth)
//!     .method(HttpMethod::Post)
//!     .path("/api/survey/answer".into())
//!     .form("question".into(), "3".into())
//!     .execute()
//!     .await?;
//! ```
//!
//! The request goes through the same header injection and error mapping as every other call.

use std::sync::{Arc, Mutex, PoisonError};

use crate::api::{ApiClient, ApiRequest};
use crate::auth::{AuthProvider, RequestAuth};
use crate::callback::{dispatch, StringCallback};
use crate::error::UseCaseError;
use crate::primitives::http_client::{HttpHeader, HttpMethod};
use crate::{debug, loyalty_export};

#[derive(Debug, Clone)]
struct PendingRequest {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    headers: Vec<HttpHeader>,
    auth: RequestAuth,
}

impl Default for PendingRequest {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            path: String::new(),
            query: Vec::new(),
            form: Vec::new(),
            headers: Vec::new(),
            auth: RequestAuth::Session,
        }
    }
}

impl PendingRequest {
    fn to_api_request(&self) -> ApiRequest {
        let mut request = ApiRequest::new(self.method, self.path.trim()).auth(self.auth);
        for (key, value) in &self.query {
            request = request.query(key, value);
        }
        for (key, value) in &self.form {
            request = request.form(key, value);
        }
        for header in &self.headers {
            request = request.header(header.name.clone(), header.value.clone());
        }
        request
    }
}

/// Builds and sends an arbitrary platform request.
///
/// Setters return the builder so calls can be chained. Defaults are `GET` with session auth.
#[derive(uniffi::Object)]
pub struct CustomApiBuilder {
    api: ApiClient,
    pending: Mutex<PendingRequest>,
}

impl CustomApiBuilder {
    pub(crate) fn with_api(api: ApiClient) -> Self {
        Self {
            api,
            pending: Mutex::new(PendingRequest::default()),
        }
    }

    fn update(self: Arc<Self>, f: impl FnOnce(&mut PendingRequest)) -> Arc<Self> {
        f(&mut self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        self
    }

    fn snapshot(&self) -> PendingRequest {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[loyalty_export]
impl CustomApiBuilder {
    /// Creates a builder.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// Sets the HTTP method.
    pub fn method(self: Arc<Self>, method: HttpMethod) -> Arc<Self> {
        self.update(|p| p.method = method)
    }

    /// Sets the path, relative to the API base URL. Segments are percent-encoded.
    pub fn path(self: Arc<Self>, path: String) -> Arc<Self> {
        self.update(|p| p.path = path)
    }

    /// Appends a query parameter.
    pub fn query(self: Arc<Self>, key: String, value: String) -> Arc<Self> {
        self.update(|p| p.query.push((key, value)))
    }

    /// Appends a form field; the body becomes form-encoded.
    pub fn form(self: Arc<Self>, key: String, value: String) -> Arc<Self> {
        self.update(|p| p.form.push((key, value)))
    }

    /// Adds a header on top of the injected ones.
    pub fn header(self: Arc<Self>, name: String, value: String) -> Arc<Self> {
        self.update(|p| p.headers.push(HttpHeader { name, value }))
    }

    /// Sets how the request is authenticated.
    pub fn auth(self: Arc<Self>, auth: RequestAuth) -> Arc<Self> {
        self.update(|p| p.auth = auth)
    }

    /// Sends the request and returns the response body as text.
    ///
    /// The builder keeps its settings, so it can be executed again.
    ///
    /// # Errors
    /// - `UseCaseError::InvalidArgument` when no path was set, or the path holds `?` or `#`
    /// - `UseCaseError::Decode` when the body is not UTF-8
    /// - any other [`UseCaseError`] from the call
    pub async fn execute(&self) -> Result<String, UseCaseError> {
        let pending = self.snapshot();
        if pending.path.trim().is_empty() {
            return Err(UseCaseError::InvalidArgument {
                message: "custom API path is not set".to_string(),
            });
        }
        if pending.path.contains(['?', '#']) {
            return Err(UseCaseError::InvalidArgument {
                message: format!("{}: pass query parameters through query()", pending.path),
            });
        }
        debug!(
            "custom {} {} ({} query, {} form fields)",
            pending.method,
            pending.path,
            pending.query.len(),
            pending.form.len()
        );
        let bytes = self.api.send_raw(pending.to_api_request()).await?;
        String::from_utf8(bytes).map_err(|e| UseCaseError::Decode {
            message: format!("{}: {e}", pending.path),
        })
    }

    /// Callback variant of [`CustomApiBuilder::execute`].
    pub fn execute_with_callback(self: Arc<Self>, callback: Arc<dyn StringCallback>) {
        dispatch(callback, async move { self.execute().await });
    }
}
