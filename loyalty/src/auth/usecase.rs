use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::{AuthProvider, AuthTokens, RequestAuth, TokenKind};
use crate::callback::{dispatch, result_callback, CompletionCallback};
use crate::error::UseCaseError;
use crate::{info, loyalty_export, warn};

/// Session issued by login, device login and connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoginResponse {
    /// Platform user id
    #[serde(rename = "UserID")]
    pub user_id: Option<String>,
    /// Session token
    pub token: Option<String>,
    /// E-wallet token
    #[serde(rename = "EWalletToken")]
    pub ewallet_token: Option<String>,
    /// JWT for partner services
    #[serde(rename = "JWT")]
    pub jwt_token: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Whether the account was created by this call
    pub is_new_user: Option<bool>,
    /// The user's preferred locale (LCID)
    pub locale: Option<i32>,
}

impl LoginResponse {
    fn tokens(&self) -> AuthTokens {
        AuthTokens {
            token: self.token.clone(),
            ewallet_token: self.ewallet_token.clone(),
            jwt_token: self.jwt_token.clone(),
            ..AuthTokens::default()
        }
    }
}

/// Tokens refreshed by resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResumeResponse {
    /// New session token
    pub token: Option<String>,
    /// New e-wallet token
    #[serde(rename = "EWalletToken")]
    pub ewallet_token: Option<String>,
    /// New JWT
    #[serde(rename = "JWT")]
    pub jwt_token: Option<String>,
    /// Session expiry, unix seconds
    pub expire_date: Option<i64>,
}

result_callback!(
    /// Receives the outcome of login, device login or connect.
    LoginCallback,
    LoginResponse
);

result_callback!(
    /// Receives the outcome of resume.
    ResumeCallback,
    ResumeResponse
);

/// Login, session refresh and logout.
///
/// Successful calls store the returned tokens in the [`AuthProvider`]; tokens the platform does
/// not return are left as they were.
#[derive(uniffi::Object)]
pub struct AuthUseCase {
    api: ApiClient,
}

impl AuthUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }

    fn auth(&self) -> &AuthProvider {
        self.api.auth()
    }

    fn store_session(&self, response: &LoginResponse) -> Result<(), UseCaseError> {
        self.auth().update(response.tokens())?;
        if let Some(locale) = response.locale {
            self.auth().set_locale(locale)?;
        }
        Ok(())
    }

    fn device_fields(&self, request: ApiRequest) -> Result<ApiRequest, UseCaseError> {
        let device_token = self
            .auth()
            .token(TokenKind::DeviceToken)?
            .filter(|t| !t.is_empty());
        Ok(request
            .form("uuid", self.auth().installation_id()?)
            .form_opt("device_token", device_token)
            .form("os", std::env::consts::OS)
            .form("client_version", &self.api.config()?.client_version))
    }
}

#[loyalty_export]
impl AuthUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// Logs in with username and password.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` for a blank username, or any other [`UseCaseError`].
    pub async fn login(
        &self,
        username: String,
        password: String,
    ) -> Result<LoginResponse, UseCaseError> {
        if username.trim().is_empty() {
            return Err(UseCaseError::InvalidArgument {
                message: "username must not be blank".to_string(),
            });
        }

        let request = ApiRequest::post("/api/auth/login")
            .auth(RequestAuth::App)
            .form("username", username.trim())
            .form("password", password);
        let request = self.device_fields(request)?;

        let response: LoginResponse = self.api.send(request).await?;
        self.store_session(&response)?;
        info!("logged in");
        Ok(response)
    }

    /// Logs in anonymously as this installation.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn device_login(&self) -> Result<LoginResponse, UseCaseError> {
        let request = self.device_fields(
            ApiRequest::post("/api/auth/device_login").auth(RequestAuth::App),
        )?;

        let response: LoginResponse = self.api.send(request).await?;
        self.store_session(&response)?;
        info!("device logged in");
        Ok(response)
    }

    /// Exchanges the stored partner connect token for a session.
    ///
    /// # Errors
    /// `UseCaseError::NotAuthenticated` without a connect token, or any other [`UseCaseError`].
    pub async fn connect(&self) -> Result<LoginResponse, UseCaseError> {
        let request = self.device_fields(
            ApiRequest::post("/api/auth/connect").auth(RequestAuth::Connect),
        )?;

        let response: LoginResponse = self.api.send(request).await?;
        self.store_session(&response)?;
        info!("connected partner session");
        Ok(response)
    }

    /// Refreshes the session and overwrites the stored tokens.
    ///
    /// # Errors
    /// `UseCaseError::NotAuthenticated` without a session, or any other [`UseCaseError`].
    pub async fn resume(&self) -> Result<ResumeResponse, UseCaseError> {
        let response: ResumeResponse =
            self.api.send(ApiRequest::post("/api/auth/resume")).await?;
        self.auth().update(AuthTokens {
            token: response.token.clone(),
            ewallet_token: response.ewallet_token.clone(),
            jwt_token: response.jwt_token.clone(),
            ..AuthTokens::default()
        })?;
        Ok(response)
    }

    /// Ends the session.
    ///
    /// The local session is cleared even when the platform call fails; the platform's result is
    /// reported afterwards. Without a session nothing is sent.
    ///
    /// # Errors
    /// The platform failure, or a storage error while clearing.
    pub async fn logout(&self) -> Result<(), UseCaseError> {
        if !self.auth().has_token(TokenKind::Token) {
            self.auth().clear_session()?;
            return Ok(());
        }

        let result = self.api.send_unit(ApiRequest::post("/api/auth/logout")).await;
        if let Err(e) = &result {
            warn!("logout request failed, clearing session anyway: {e}");
        }
        self.auth().clear_session()?;
        result
    }

    /// Stores the push registration token and, with a session, registers it with the platform.
    ///
    /// # Errors
    /// A storage error, or the platform failure.
    pub async fn update_device_token(&self, device_token: String) -> Result<(), UseCaseError> {
        self.auth()
            .set_token(TokenKind::DeviceToken, device_token.clone())?;
        if !self.auth().has_token(TokenKind::Token) {
            return Ok(());
        }

        self.api
            .send_unit(
                ApiRequest::post("/api/auth/update_device")
                    .form("uuid", self.auth().installation_id()?)
                    .form("device_token", device_token),
            )
            .await
    }

    /// Callback variant of [`AuthUseCase::login`].
    pub fn login_with_callback(
        self: Arc<Self>,
        username: String,
        password: String,
        callback: Arc<dyn LoginCallback>,
    ) {
        dispatch(callback, async move { self.login(username, password).await });
    }

    /// Callback variant of [`AuthUseCase::device_login`].
    pub fn device_login_with_callback(self: Arc<Self>, callback: Arc<dyn LoginCallback>) {
        dispatch(callback, async move { self.device_login().await });
    }

    /// Callback variant of [`AuthUseCase::connect`].
    pub fn connect_with_callback(self: Arc<Self>, callback: Arc<dyn LoginCallback>) {
        dispatch(callback, async move { self.connect().await });
    }

    /// Callback variant of [`AuthUseCase::resume`].
    pub fn resume_with_callback(self: Arc<Self>, callback: Arc<dyn ResumeCallback>) {
        dispatch(callback, async move { self.resume().await });
    }

    /// Callback variant of [`AuthUseCase::logout`].
    pub fn logout_with_callback(self: Arc<Self>, callback: Arc<dyn CompletionCallback>) {
        dispatch(callback, async move { self.logout().await });
    }

    /// Callback variant of [`AuthUseCase::update_device_token`].
    pub fn update_device_token_with_callback(
        self: Arc<Self>,
        device_token: String,
        callback: Arc<dyn CompletionCallback>,
    ) {
        dispatch(callback, async move {
            self.update_device_token(device_token).await
        });
    }
}
