//! URL and form-body construction for platform requests.

use std::borrow::Cow;
use std::fmt::Display;
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::error::UseCaseError;
use crate::primitives::config::get_config;
use crate::primitives::http_client::HttpHeader;

/// Builds absolute URLs from a base, path segments and query pairs.
///
/// Segments are joined with exactly one `/` and percent-encoded; a segment that is already
/// encoded is not encoded twice. Query keys and values are percent-encoded and pairs whose value
/// is `None` are skipped.
///
/// ```rust
/// use loyalty::primitives::url::UrlBuilder;
///
/// let url = UrlBuilder::new("https://api.example.com/")
///     .path("/api/campaign")
///     .query("config", "campaign_food")
///     .query_opt("cat", None::<i64>)
///     .query("top", 20)
///     .build();
/// assert_eq!(url, "https://api.example.com/api/campaign?config=campaign_food&top=20");
/// ```
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl UrlBuilder {
    /// Starts a URL at `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            segments: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Appends a path, which may itself contain several `/`-separated segments.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<str>) -> Self {
        self.segments.extend(
            path.as_ref()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(encode_segment),
        );
        self
    }

    /// Appends a query pair.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends a query pair only when `value` is present.
    #[must_use]
    pub fn query_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Appends already-collected query pairs.
    #[must_use]
    pub fn query_pairs(mut self, pairs: &[(String, String)]) -> Self {
        self.query.extend_from_slice(pairs);
        self
    }

    /// Renders the URL.
    #[must_use]
    pub fn build(&self) -> String {
        let mut url = self.base.trim_end_matches('/').to_string();
        for segment in &self.segments {
            url.push('/');
            url.push_str(segment);
        }
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&encode_pairs(&self.query));
        }
        url
    }
}

fn encode_segment(segment: &str) -> String {
    let decoded = urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment));
    urlencoding::encode(&decoded).into_owned()
}

/// Encodes pairs as `application/x-www-form-urlencoded`.
#[must_use]
pub fn encode_form(pairs: &[(String, String)]) -> Vec<u8> {
    encode_pairs(pairs).into_bytes()
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// URL of a campaign's cover image on the CDN.
///
/// `version` is the campaign's modify timestamp; it busts image caches when a campaign changes.
///
/// # Errors
/// `UseCaseError::ConfigNotInitialized` when the SDK is not configured.
#[uniffi::export]
pub fn campaign_image_url(campaign_id: i64, version: Option<i64>) -> Result<String, UseCaseError> {
    let config = get_config().ok_or(UseCaseError::ConfigNotInitialized)?;
    Ok(UrlBuilder::new(&config.image_base_url)
        .path(format!("api/campaign/{campaign_id}/picture"))
        .query_opt("v", version)
        .build())
}

/// URL of an arbitrary CDN asset path.
///
/// Absolute `http(s)` URLs are returned unchanged.
///
/// # Errors
/// `UseCaseError::ConfigNotInitialized` when the SDK is not configured.
#[uniffi::export]
pub fn image_url(path: String) -> Result<String, UseCaseError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(path);
    }
    let config = get_config().ok_or(UseCaseError::ConfigNotInitialized)?;
    Ok(UrlBuilder::new(&config.image_base_url).path(path).build())
}

/// Headers an image loader (Glide, Coil, Kingfisher) must send for protected CDN images.
///
/// Always includes the app headers; includes the session token when one is stored.
///
/// # Errors
/// `UseCaseError::ConfigNotInitialized` when the SDK is not configured, or a storage error
/// while reading the token.
#[uniffi::export]
pub fn image_headers(auth: Arc<AuthProvider>) -> Result<Vec<HttpHeader>, UseCaseError> {
    let config = get_config().ok_or(UseCaseError::ConfigNotInitialized)?;
    crate::auth::headers::image_headers(config, &auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_are_joined_with_single_slash() {
        let url = UrlBuilder::new("https://api.test.local//")
            .path("/api//campaign/")
            .path("42")
            .build();
        assert_eq!(url, "https://api.test.local/api/campaign/42");
    }

    #[test]
    fn test_path_segments_are_encoded_once() {
        let url = UrlBuilder::new("https://api.test.local")
            .path("/api/search/coffee & tea")
            .path("x?y=1")
            .path("RK%2F7")
            .build();
        assert_eq!(
            url,
            "https://api.test.local/api/search/coffee%20%26%20tea/x%3Fy%3D1/RK%2F7"
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let url = UrlBuilder::new("https://api.test.local")
            .path("api/place")
            .query("keyword", "coffee & tea")
            .query("center", "13.75,100.5")
            .build();
        assert_eq!(
            url,
            "https://api.test.local/api/place?keyword=coffee%20%26%20tea&center=13.75%2C100.5"
        );
    }

    #[test]
    fn test_missing_optional_values_are_skipped() {
        let url = UrlBuilder::new("https://api.test.local")
            .path("api/noti")
            .query_opt("mode", None::<String>)
            .query_opt("sortby", Some("CreateDate"))
            .build();
        assert_eq!(url, "https://api.test.local/api/noti?sortby=CreateDate");
    }

    #[test]
    fn test_encode_form() {
        let body = encode_form(&[
            ("username".to_string(), "jane@example.com".to_string()),
            ("password".to_string(), "p@ss word".to_string()),
        ]);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "username=jane%40example.com&password=p%40ss%20word"
        );
    }
}
