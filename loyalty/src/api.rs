//! The request pipeline every use case goes through.
//!
//! An [`ApiRequest`] describes one call (method, path, query, body, [`RequestAuth`] mode).
//! [`ApiClient`] turns it into a URL and headers, hands it to the native HTTP client and maps the
//! response: non-2xx statuses and 2xx bodies carrying an error envelope become
//! [`UseCaseError::Api`], undecodable bodies become [`UseCaseError::Decode`].

use std::fmt::Display;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::auth::headers::request_headers;
use crate::auth::{AuthProvider, RequestAuth};
use crate::error::UseCaseError;
use crate::primitives::config::{get_config, Environment, SdkConfig};
use crate::primitives::http_client::{get_http_client, HttpHeader, HttpMethod, LoyaltyHttpClient};
use crate::primitives::url::{encode_form, UrlBuilder};
use crate::{debug, trace, warn};

const CONTENT_TYPE: &str = "Content-Type";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, PartialEq, Eq)]
enum RequestBody {
    None,
    Form(Vec<(String, String)>),
}

/// One platform call.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    headers: Vec<HttpHeader>,
    auth: RequestAuth,
}

impl ApiRequest {
    pub(crate) fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            headers: Vec::new(),
            auth: RequestAuth::Session,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub(crate) fn auth(mut self, auth: RequestAuth) -> Self {
        self.auth = auth;
        self
    }

    pub(crate) fn query(mut self, key: &str, value: impl Display) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn query_opt<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// `skip` and `top` paging parameters, each only when given.
    pub(crate) fn paging(self, skip: Option<u32>, top: Option<u32>) -> Self {
        self.query_opt("skip", skip).query_opt("top", top)
    }

    /// Adds a form field. The body becomes `application/x-www-form-urlencoded`.
    pub(crate) fn form(mut self, key: &str, value: impl Display) -> Self {
        let pair = (key.to_string(), value.to_string());
        match &mut self.body {
            RequestBody::Form(pairs) => pairs.push(pair),
            body => *body = RequestBody::Form(vec![pair]),
        }
        self
    }

    pub(crate) fn form_opt<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.form(key, value),
            None => self,
        }
    }

    pub(crate) fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(name, value));
        self
    }
}

/// Sends [`ApiRequest`]s on behalf of the use cases.
///
/// Uses the process-wide config and HTTP client unless overrides are given, which tests do.
#[derive(Clone)]
pub(crate) struct ApiClient {
    auth: Arc<AuthProvider>,
    http: Option<Arc<dyn LoyaltyHttpClient>>,
    config: Option<SdkConfig>,
}

impl ApiClient {
    pub(crate) const fn new(auth: Arc<AuthProvider>) -> Self {
        Self {
            auth,
            http: None,
            config: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_parts(
        auth: Arc<AuthProvider>,
        http: Arc<dyn LoyaltyHttpClient>,
        config: SdkConfig,
    ) -> Self {
        Self {
            auth,
            http: Some(http),
            config: Some(config),
        }
    }

    pub(crate) const fn auth(&self) -> &Arc<AuthProvider> {
        &self.auth
    }

    pub(crate) fn config(&self) -> Result<&SdkConfig, UseCaseError> {
        match &self.config {
            Some(config) => Ok(config),
            None => get_config().ok_or(UseCaseError::ConfigNotInitialized),
        }
    }

    fn http(&self) -> Result<Arc<dyn LoyaltyHttpClient>, UseCaseError> {
        self.http
            .clone()
            .or_else(get_http_client)
            .ok_or(UseCaseError::HttpClientNotInitialized)
    }

    /// Sends the request and returns the raw body of a successful response.
    pub(crate) async fn send_raw(&self, request: ApiRequest) -> Result<Vec<u8>, UseCaseError> {
        let config = self.config()?;
        let http = self.http()?;

        let mut headers = request_headers(config, &self.auth, request.auth)?;
        headers.extend(request.headers);

        let url = UrlBuilder::new(&config.api_base_url)
            .path(&request.path)
            .query_pairs(&request.query)
            .build();

        let body = match request.body {
            RequestBody::None => None,
            RequestBody::Form(pairs) => {
                headers.push(HttpHeader::new(CONTENT_TYPE, FORM_CONTENT_TYPE));
                Some(encode_form(&pairs))
            }
        };

        let method = request.method;
        let path = request.path;
        debug!("{method} {path}");

        let response = match http.fetch(url, method, headers, body).await {
            Ok(response) => response,
            Err(e) => {
                let error = UseCaseError::from(e);
                warn!("{method} {path} failed: {error}");
                return Err(error);
            }
        };

        if let Some(error) = UseCaseError::from_success_body(&response) {
            warn!("{method} {path} returned an error envelope: {error}");
            return Err(error);
        }

        if config.environment == Environment::Staging {
            trace!(
                "{method} {path} response: {}",
                String::from_utf8_lossy(&response)
            );
        }
        debug!("{method} {path} ok ({} bytes)", response.len());
        Ok(response)
    }

    /// Sends the request and decodes the JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, UseCaseError> {
        let path = request.path.clone();
        let bytes = self.send_raw(request).await?;
        decode(&path, &bytes)
    }

    /// Sends the request and ignores the body.
    pub(crate) async fn send_unit(&self, request: ApiRequest) -> Result<(), UseCaseError> {
        self.send_raw(request).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, UseCaseError> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!("failed to decode response of {path}: {e}");
        UseCaseError::Decode {
            message: format!("{path}: {e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::primitives::http_client::HttpError;
    use crate::test_utils::{logged_in_api, test_api, MockHttpClient};

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "PascalCase")]
    struct Balance {
        points: i64,
    }

    #[tokio::test]
    async fn test_builds_url_headers_and_form_body() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!({ "Points": 120 }));
        let api = logged_in_api(&mock);

        let balance: Balance = api
            .send(
                ApiRequest::post("/api/point/redeem")
                    .query("campaign", 7)
                    .query_opt("mode", None::<String>)
                    .form("amount", 10)
                    .form("note", "first & last"),
            )
            .await
            .unwrap();

        assert_eq!(balance, Balance { points: 120 });
        let request = mock.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.test.local/api/point/redeem?campaign=7");
        assert_eq!(request.header("Authorization"), Some("token session-token"));
        assert_eq!(request.header("Content-Type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(request.body_text().as_deref(), Some("amount=10&note=first%20%26%20last"));
    }

    #[tokio::test]
    async fn test_missing_session_fails_before_sending() {
        let mock = MockHttpClient::new();
        let (api, _) = test_api(&mock);

        let result: Result<Balance, _> = api.send(ApiRequest::get("/api/point")).await;

        assert!(matches!(
            result,
            Err(UseCaseError::NotAuthenticated { token }) if token == "token"
        ));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_app_requests_need_no_token() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!({}));
        let (api, _) = test_api(&mock);

        api.send_unit(ApiRequest::get("/api/app/ping").auth(RequestAuth::App))
            .await
            .unwrap();

        assert_eq!(mock.last_request().header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_bad_status_maps_error_envelope() {
        let mock = MockHttpClient::new();
        mock.respond_status(
            409,
            json!({ "error": { "code": 409, "id": "1905", "message": "Sold out" } }),
        );
        let api = logged_in_api(&mock);

        let error = api
            .send_unit(ApiRequest::post("/api/campaign/1/redeem"))
            .await
            .unwrap_err();

        match error {
            UseCaseError::Api { code, id, message } => {
                assert_eq!(code, 409);
                assert_eq!(id.as_deref(), Some("1905"));
                assert_eq!(message, "Sold out");
            }
            e => panic!("Expected Api error, got: {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_envelope_in_success_body() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!({ "error": { "code": 1409, "message": "Already used" } }));
        let api = logged_in_api(&mock);

        let result: Result<Balance, _> = api.send(ApiRequest::get("/api/point")).await;
        assert!(matches!(result, Err(UseCaseError::Api { code: 1409, .. })));
    }

    #[tokio::test]
    async fn test_transport_and_decode_failures() {
        let mock = MockHttpClient::new();
        mock.respond_error(HttpError::NoConnectivity);
        mock.respond_json(json!({ "Points": "many" }));
        let api = logged_in_api(&mock);

        let result: Result<Balance, _> = api.send(ApiRequest::get("/api/point")).await;
        assert!(matches!(result, Err(UseCaseError::Network { .. })));

        let result: Result<Balance, _> = api.send(ApiRequest::get("/api/point")).await;
        match result {
            Err(UseCaseError::Decode { message }) => assert!(message.starts_with("/api/point:")),
            other => panic!("Expected Decode error, got: {other:?}"),
        }
    }
}
