//! Session credentials, request authentication and the authentication use case.
//!
//! [`AuthProvider`] persists the session tokens and locale preference in the device key-value
//! store. [`headers`] turns a [`RequestAuth`] mode into request headers, and [`AuthUseCase`]
//! runs the login, connect, resume and logout flows that fill the provider.

use std::sync::Arc;

use crate::localization::Locale;
use crate::primitives::config::get_config;
use crate::primitives::key_value_store::{
    DeviceKeyValueStore, KeyValueStoreError, KeyValueStoreExt,
};
use crate::{debug, info, loyalty_export, warn};

/// Header injection for the login, connect and session flows.
pub mod headers;

mod usecase;

pub use headers::RequestAuth;
pub use usecase::{
    AuthUseCase, LoginCallback, LoginResponse, ResumeCallback, ResumeResponse,
};

const KEY_PREFIX: &str = "loyalty.auth.";
const LOCALE_KEY: &str = "loyalty.auth.locale";
const INSTALLATION_ID_KEY: &str = "loyalty.device.installation_id";

/// The tokens the SDK keeps for the current user and device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    /// Session token, sent as `Authorization: token <value>`
    Token,
    /// E-wallet token, sent as `Ewallet-Token` on wallet calls
    EwalletToken,
    /// JWT issued alongside the session for partner services
    JwtToken,
    /// Partner single-sign-on token used by the connect flow
    ConnectToken,
    /// Push notification registration token of this device
    DeviceToken,
}

impl TokenKind {
    /// Tokens removed on logout. The device token belongs to the device, not the session.
    pub const SESSION: [Self; 4] = [
        Self::Token,
        Self::EwalletToken,
        Self::JwtToken,
        Self::ConnectToken,
    ];

    fn key(self) -> String {
        format!("{KEY_PREFIX}{self}")
    }
}

/// Several tokens at once; `None` fields are left untouched by [`AuthProvider::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct AuthTokens {
    /// Session token
    pub token: Option<String>,
    /// E-wallet token
    pub ewallet_token: Option<String>,
    /// JWT token
    pub jwt_token: Option<String>,
    /// Connect (partner SSO) token
    pub connect_token: Option<String>,
    /// Push registration token
    pub device_token: Option<String>,
}

impl AuthTokens {
    fn entries(self) -> [(TokenKind, Option<String>); 5] {
        [
            (TokenKind::Token, self.token),
            (TokenKind::EwalletToken, self.ewallet_token),
            (TokenKind::JwtToken, self.jwt_token),
            (TokenKind::ConnectToken, self.connect_token),
            (TokenKind::DeviceToken, self.device_token),
        ]
    }
}

/// Persistent store for session tokens and the locale preference.
///
/// Every token is an independent key; writes overwrite (last write wins). A token that is
/// stored as an empty string counts as absent for [`AuthProvider::has_token`] and for request
/// authentication.
///
/// # Examples
///
/// ## Kotlin
///
/// ```kotlin
/// val auth = AuthProvider(SharedPreferencesStore(context))
/// if (!auth.hasToken(TokenKind.TOKEN)) {
///     AuthUseCase(auth).deviceLogin()
/// }
/// ```
#[derive(uniffi::Object)]
pub struct AuthProvider {
    store: Arc<dyn DeviceKeyValueStore>,
}

#[loyalty_export]
impl AuthProvider {
    /// Creates a provider on top of the app's key-value store.
    #[uniffi::constructor]
    pub fn new(store: Arc<dyn DeviceKeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads a token.
    ///
    /// # Errors
    /// Store failures other than a missing key.
    pub fn token(&self, kind: TokenKind) -> Result<Option<String>, KeyValueStoreError> {
        self.store.get_optional(&kind.key())
    }

    /// Stores a token, replacing any previous value.
    ///
    /// # Errors
    /// `KeyValueStoreError::UpdateFailure` if the store cannot write.
    pub fn set_token(&self, kind: TokenKind, value: String) -> Result<(), KeyValueStoreError> {
        debug!("storing {kind}");
        self.store.set(kind.key(), value)
    }

    /// Removes a token. Removing an absent token is not an error.
    ///
    /// # Errors
    /// Store failures other than a missing key.
    pub fn remove_token(&self, kind: TokenKind) -> Result<(), KeyValueStoreError> {
        self.store.delete_if_present(&kind.key()).map(|_| ())
    }

    /// Whether a non-empty token is stored. Store failures are logged and count as absent.
    #[must_use]
    pub fn has_token(&self, kind: TokenKind) -> bool {
        match self.token(kind) {
            Ok(value) => value.is_some_and(|v| !v.is_empty()),
            Err(e) => {
                warn!("failed to read {kind}: {e}");
                false
            }
        }
    }

    /// Writes every `Some` field of `tokens` and leaves the others untouched.
    ///
    /// # Errors
    /// The first store failure; earlier writes are kept.
    pub fn update(&self, tokens: AuthTokens) -> Result<(), KeyValueStoreError> {
        for (kind, value) in tokens.entries() {
            if let Some(value) = value {
                self.set_token(kind, value)?;
            }
        }
        Ok(())
    }

    /// Removes the session tokens. The device token, installation id and locale are kept.
    ///
    /// # Errors
    /// The first store failure.
    pub fn clear_session(&self) -> Result<(), KeyValueStoreError> {
        for kind in TokenKind::SESSION {
            self.remove_token(kind)?;
        }
        info!("session cleared");
        Ok(())
    }

    /// The stored locale LCID, or the configured default (Thai without a config).
    #[must_use]
    pub fn locale(&self) -> i32 {
        let default = get_config().map_or(Locale::Thai.lcid(), |config| config.default_locale);
        self.locale_or(default)
    }

    /// Stores the locale LCID.
    ///
    /// # Errors
    /// `KeyValueStoreError::UpdateFailure` if the store cannot write.
    pub fn set_locale(&self, lcid: i32) -> Result<(), KeyValueStoreError> {
        if Locale::from_lcid(lcid).is_none() {
            warn!("storing unsupported locale {lcid}");
        }
        self.store.set(LOCALE_KEY.to_string(), lcid.to_string())
    }

    /// A stable random id for this installation, created on first use.
    ///
    /// # Errors
    /// Store failures while reading or persisting the id.
    pub fn installation_id(&self) -> Result<String, KeyValueStoreError> {
        if let Some(id) = self.store.get_optional(INSTALLATION_ID_KEY)? {
            if !id.is_empty() {
                return Ok(id);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.store.set(INSTALLATION_ID_KEY.to_string(), id.clone())?;
        info!("generated installation id");
        Ok(id)
    }
}

impl AuthProvider {
    /// The stored locale, or `default` when none is stored or it cannot be read.
    pub(crate) fn locale_or(&self, default: i32) -> i32 {
        match self.store.get_optional(LOCALE_KEY) {
            Ok(Some(value)) => value.trim().parse().unwrap_or_else(|_| {
                warn!("ignoring unparsable locale {value:?}");
                default
            }),
            Ok(None) => default,
            Err(e) => {
                warn!("failed to read locale: {e}");
                default
            }
        }
    }

    /// A non-empty token, or `NotAuthenticated`.
    pub(crate) fn require(&self, kind: TokenKind) -> Result<String, crate::error::UseCaseError> {
        self.token(kind)?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| crate::error::UseCaseError::NotAuthenticated {
                token: kind.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UseCaseError;
    use crate::primitives::key_value_store::InMemoryDeviceKeyValueStore;

    fn provider() -> (AuthProvider, Arc<InMemoryDeviceKeyValueStore>) {
        let store = Arc::new(InMemoryDeviceKeyValueStore::new());
        (AuthProvider::new(store.clone()), store)
    }

    #[test]
    fn test_tokens_are_independent() {
        let (auth, _) = provider();
        auth.set_token(TokenKind::Token, "session".to_string()).unwrap();
        auth.set_token(TokenKind::JwtToken, "jwt".to_string()).unwrap();

        assert_eq!(auth.token(TokenKind::Token).unwrap().as_deref(), Some("session"));
        assert_eq!(auth.token(TokenKind::JwtToken).unwrap().as_deref(), Some("jwt"));
        assert_eq!(auth.token(TokenKind::EwalletToken).unwrap(), None);
    }

    #[test]
    fn test_keys_are_namespaced() {
        let (auth, store) = provider();
        auth.set_token(TokenKind::EwalletToken, "wallet".to_string()).unwrap();

        assert_eq!(
            store.get("loyalty.auth.ewallet_token".to_string()).unwrap(),
            "wallet"
        );
    }

    #[test]
    fn test_has_token_ignores_empty_values() {
        let (auth, _) = provider();
        assert!(!auth.has_token(TokenKind::Token));

        auth.set_token(TokenKind::Token, String::new()).unwrap();
        assert!(!auth.has_token(TokenKind::Token));
        assert!(matches!(
            auth.require(TokenKind::Token),
            Err(UseCaseError::NotAuthenticated { token }) if token == "token"
        ));

        auth.set_token(TokenKind::Token, "session".to_string()).unwrap();
        assert!(auth.has_token(TokenKind::Token));
    }

    #[test]
    fn test_update_skips_none_fields() {
        let (auth, _) = provider();
        auth.set_token(TokenKind::Token, "old-session".to_string()).unwrap();
        auth.set_token(TokenKind::DeviceToken, "fcm".to_string()).unwrap();

        auth.update(AuthTokens {
            token: Some("new-session".to_string()),
            jwt_token: Some("jwt".to_string()),
            ..AuthTokens::default()
        })
        .unwrap();

        assert_eq!(auth.token(TokenKind::Token).unwrap().as_deref(), Some("new-session"));
        assert_eq!(auth.token(TokenKind::JwtToken).unwrap().as_deref(), Some("jwt"));
        assert_eq!(auth.token(TokenKind::DeviceToken).unwrap().as_deref(), Some("fcm"));
        assert_eq!(auth.token(TokenKind::ConnectToken).unwrap(), None);
    }

    #[test]
    fn test_clear_session_keeps_device_state() {
        let (auth, _) = provider();
        auth.update(AuthTokens {
            token: Some("session".to_string()),
            ewallet_token: Some("wallet".to_string()),
            device_token: Some("fcm".to_string()),
            ..AuthTokens::default()
        })
        .unwrap();
        auth.set_locale(1033).unwrap();
        let installation_id = auth.installation_id().unwrap();

        auth.clear_session().unwrap();

        assert!(!auth.has_token(TokenKind::Token));
        assert!(!auth.has_token(TokenKind::EwalletToken));
        assert!(auth.has_token(TokenKind::DeviceToken));
        assert_eq!(auth.locale_or(1054), 1033);
        assert_eq!(auth.installation_id().unwrap(), installation_id);
    }

    #[test]
    fn test_locale_defaults_and_parsing() {
        let (auth, store) = provider();
        assert_eq!(auth.locale_or(1054), 1054);

        auth.set_locale(1033).unwrap();
        assert_eq!(auth.locale_or(1054), 1033);

        store
            .set("loyalty.auth.locale".to_string(), "english".to_string())
            .unwrap();
        assert_eq!(auth.locale_or(1054), 1054);
    }

    #[test]
    fn test_installation_id_is_stable() {
        let (auth, _) = provider();
        let first = auth.installation_id().unwrap();
        let second = auth.installation_id().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 36);
    }
}
