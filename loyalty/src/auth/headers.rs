use crate::auth::{AuthProvider, TokenKind};
use crate::error::UseCaseError;
use crate::localization::Locale;
use crate::primitives::config::SdkConfig;
use crate::primitives::http_client::HttpHeader;

pub(crate) const APP_ID: &str = "App-Id";
pub(crate) const SUBSCRIPTION_KEY: &str = "Ocp-Apim-Subscription-Key";
pub(crate) const ACCEPT_LANGUAGE: &str = "Accept-Language";
pub(crate) const DEVICE_LOCALE: &str = "Device-Locale";
pub(crate) const CLIENT_VERSION: &str = "Client-Version";
pub(crate) const AUTHORIZATION: &str = "Authorization";
pub(crate) const EWALLET_TOKEN: &str = "Ewallet-Token";

/// How a request authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Enum)]
pub enum RequestAuth {
    /// App headers only. Login and device login use this.
    App,
    /// `Authorization: token <session token>`
    #[default]
    Session,
    /// `Authorization: Bearer <connect token>`, for partner single sign-on
    Connect,
    /// Session authorization plus `Ewallet-Token`
    Wallet,
}

/// Headers sent with every request, authenticated or not.
pub(crate) fn app_headers(config: &SdkConfig, lcid: i32) -> Vec<HttpHeader> {
    let locale = Locale::from_lcid(lcid).unwrap_or_else(|| config.locale());

    let mut headers = vec![HttpHeader::new(APP_ID, &config.app_id)];
    if let Some(key) = config.subscription_key.as_deref().filter(|k| !k.is_empty()) {
        headers.push(HttpHeader::new(SUBSCRIPTION_KEY, key));
    }
    headers.push(HttpHeader::new(ACCEPT_LANGUAGE, locale.language_tag()));
    headers.push(HttpHeader::new(DEVICE_LOCALE, lcid.to_string()));
    headers.push(HttpHeader::new(CLIENT_VERSION, &config.client_version));
    headers
}

/// App headers plus whatever `mode` requires.
///
/// Fails with `NotAuthenticated` when a required token is missing, so no request leaves the
/// device without its credentials.
pub(crate) fn request_headers(
    config: &SdkConfig,
    auth: &AuthProvider,
    mode: RequestAuth,
) -> Result<Vec<HttpHeader>, UseCaseError> {
    let mut headers = app_headers(config, auth.locale_or(config.default_locale));

    match mode {
        RequestAuth::App => {}
        RequestAuth::Session => {
            let token = auth.require(TokenKind::Token)?;
            headers.push(HttpHeader::new(AUTHORIZATION, format!("token {token}")));
        }
        RequestAuth::Connect => {
            let token = auth.require(TokenKind::ConnectToken)?;
            headers.push(HttpHeader::new(AUTHORIZATION, format!("Bearer {token}")));
        }
        RequestAuth::Wallet => {
            let token = auth.require(TokenKind::Token)?;
            let ewallet = auth.require(TokenKind::EwalletToken)?;
            headers.push(HttpHeader::new(AUTHORIZATION, format!("token {token}")));
            headers.push(HttpHeader::new(EWALLET_TOKEN, ewallet));
        }
    }

    Ok(headers)
}

/// App headers plus the session token when one is stored.
pub(crate) fn image_headers(
    config: &SdkConfig,
    auth: &AuthProvider,
) -> Result<Vec<HttpHeader>, UseCaseError> {
    let mut headers = app_headers(config, auth.locale_or(config.default_locale));
    if let Some(token) = auth.token(TokenKind::Token)?.filter(|t| !t.is_empty()) {
        headers.push(HttpHeader::new(AUTHORIZATION, format!("token {token}")));
    }
    Ok(headers)
}
