//! Test utilities for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::api::ApiClient;
use crate::auth::{AuthProvider, TokenKind};
use crate::primitives::config::test_config;
use crate::primitives::http_client::{HttpError, HttpHeader, HttpMethod, LoyaltyHttpClient};
use crate::primitives::key_value_store::InMemoryDeviceKeyValueStore;

/// A request as the mock client received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<HttpHeader>,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// The URL without the test base URL and without the query string.
    pub fn path(&self) -> &str {
        let without_base = self
            .url
            .strip_prefix("https://api.test.local")
            .unwrap_or(&self.url);
        without_base
            .split_once('?')
            .map_or(without_base, |(path, _)| path)
    }

    /// Decoded value of a query parameter.
    pub fn query(&self, key: &str) -> Option<String> {
        let (_, query) = self.url.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| urlencoding::decode(v).unwrap().into_owned())
        })
    }

    /// Decoded value of a form field.
    pub fn form(&self, key: &str) -> Option<String> {
        let body = self.body_text()?;
        body.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| urlencoding::decode(v).unwrap().into_owned())
        })
    }
}

/// Mock HTTP client that replays queued responses in order and records every request.
pub struct MockHttpClient {
    responses: Mutex<VecDeque<Result<Vec<u8>, HttpError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn respond_json(&self, value: serde_json::Value) {
        self.respond_bytes(value.to_string().into_bytes());
    }

    pub fn respond_bytes(&self, body: Vec<u8>) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn respond_status(&self, code: u64, value: serde_json::Value) {
        self.respond_error(HttpError::BadStatusCode {
            code,
            response_body: value.to_string().into_bytes(),
        });
    }

    pub fn respond_error(&self, error: HttpError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl LoyaltyHttpClient for MockHttpClient {
    async fn fetch(
        &self,
        url: String,
        method: HttpMethod,
        headers: Vec<HttpHeader>,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, HttpError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url,
            method,
            headers,
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(HttpError::Generic {
                    message: "no response queued".to_string(),
                })
            })
    }
}

/// An `ApiClient` on the test config and an empty in-memory store.
pub fn test_api(mock: &Arc<MockHttpClient>) -> (ApiClient, Arc<AuthProvider>) {
    let auth = Arc::new(AuthProvider::new(Arc::new(
        InMemoryDeviceKeyValueStore::new(),
    )));
    let api = ApiClient::with_parts(auth.clone(), mock.clone(), test_config());
    (api, auth)
}

/// Like [`test_api`], with `session-token` and `wallet-token` stored.
pub fn logged_in_api(mock: &Arc<MockHttpClient>) -> ApiClient {
    let (api, auth) = test_api(mock);
    auth.set_token(TokenKind::Token, "session-token".to_string())
        .unwrap();
    auth.set_token(TokenKind::EwalletToken, "wallet-token".to_string())
        .unwrap();
    api
}
