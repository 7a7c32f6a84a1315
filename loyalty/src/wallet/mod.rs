use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::{AuthProvider, RequestAuth};
use crate::callback::{dispatch, result_callback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// Kind, title and signed amount of point-log rows.
pub mod point_log;

pub use point_log::{PointLogDisplay, PointLogExtractorConfig, PointLogKind, PointLogStyle};

/// The user's point balance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct PointBalance {
    /// Spendable points
    pub points: Option<f64>,
    /// Points waiting for confirmation
    pub pending_points: Option<f64>,
    /// Points expiring next
    pub expiring_points: Option<f64>,
    /// When `expiring_points` expire, unix seconds
    pub expiring_date: Option<i64>,
}

/// The user's e-wallet balance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct WalletBalance {
    /// Available amount
    pub balance: Option<f64>,
    /// ISO currency code
    pub currency: Option<String>,
    /// Wallet status as sent by the platform
    pub status: Option<String>,
}

/// One point movement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct PointLog {
    /// Log id
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Movement type: `earn`, `burn`, `expire`, `adjust`
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    /// Title from the platform
    pub title: Option<String>,
    /// Additional description
    pub detail: Option<String>,
    /// Amount of points
    pub points: Option<f64>,
    /// When the movement happened, unix seconds
    pub create_date: Option<i64>,
    /// Reference of the originating transaction
    pub ref_code: Option<String>,
}

/// A point-log row and its display projection.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct PointLogEntry {
    /// Raw log
    pub log: PointLog,
    /// Derived kind, title and amount
    pub display: PointLogDisplay,
}

result_callback!(
    /// Receives the point balance.
    PointBalanceCallback,
    PointBalance
);

result_callback!(
    /// Receives the e-wallet balance.
    WalletBalanceCallback,
    WalletBalance
);

result_callback!(
    /// Receives a page of point logs.
    PointLogListCallback,
    Vec<PointLog>
);

result_callback!(
    /// Receives a page of point-log entries.
    PointLogEntryListCallback,
    Vec<PointLogEntry>
);

/// Points, e-wallet balance and point history.
#[derive(uniffi::Object)]
pub struct WalletUseCase {
    api: ApiClient,
}

impl WalletUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl WalletUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// The user's point balance.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn points(&self) -> Result<PointBalance, UseCaseError> {
        self.api.send(ApiRequest::get("/api/point")).await
    }

    /// The e-wallet balance. Needs both the session and the e-wallet token.
    ///
    /// # Errors
    /// `UseCaseError::NotAuthenticated` without an e-wallet token, or any other
    /// [`UseCaseError`].
    pub async fn balance(&self) -> Result<WalletBalance, UseCaseError> {
        self.api
            .send(ApiRequest::get("/api/ewallet/balance").auth(RequestAuth::Wallet))
            .await
    }

    /// A page of point movements, optionally limited to one month (`YYYYMM`).
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn point_log(
        &self,
        month: Option<String>,
        skip: Option<u32>,
        top: Option<u32>,
    ) -> Result<Vec<PointLog>, UseCaseError> {
        self.api
            .send(
                ApiRequest::get("/api/point/log")
                    .query_opt("month", month.filter(|m| !m.is_empty()))
                    .paging(skip, top),
            )
            .await
    }

    /// A page of point movements with their display projection, using the process-wide
    /// [`PointLogExtractorConfig`].
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn point_log_display(
        &self,
        month: Option<String>,
        skip: Option<u32>,
        top: Option<u32>,
    ) -> Result<Vec<PointLogEntry>, UseCaseError> {
        let logs = self.point_log(month, skip, top).await?;
        let config = point_log::current_config();
        Ok(logs
            .into_iter()
            .map(|log| {
                let display = point_log::extract(&log, &config);
                PointLogEntry { log, display }
            })
            .collect())
    }

    /// Callback variant of [`WalletUseCase::points`].
    pub fn points_with_callback(self: Arc<Self>, callback: Arc<dyn PointBalanceCallback>) {
        dispatch(callback, async move { self.points().await });
    }

    /// Callback variant of [`WalletUseCase::balance`].
    pub fn balance_with_callback(self: Arc<Self>, callback: Arc<dyn WalletBalanceCallback>) {
        dispatch(callback, async move { self.balance().await });
    }

    /// Callback variant of [`WalletUseCase::point_log`].
    pub fn point_log_with_callback(
        self: Arc<Self>,
        month: Option<String>,
        skip: Option<u32>,
        top: Option<u32>,
        callback: Arc<dyn PointLogListCallback>,
    ) {
        dispatch(callback, async move { self.point_log(month, skip, top).await });
    }

    /// Callback variant of [`WalletUseCase::point_log_display`].
    pub fn point_log_display_with_callback(
        self: Arc<Self>,
        month: Option<String>,
        skip: Option<u32>,
        top: Option<u32>,
        callback: Arc<dyn PointLogEntryListCallback>,
    ) {
        dispatch(callback, async move {
            self.point_log_display(month, skip, top).await
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::TokenKind;
    use crate::test_utils::{logged_in_api, test_api, MockHttpClient};

    #[tokio::test]
    async fn test_points() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!({ "Points": 1250, "ExpiringPoints": 100.5 }));
        let wallet = WalletUseCase::with_api(logged_in_api(&mock));

        let balance = wallet.points().await.unwrap();

        assert_eq!(balance.points, Some(1250.0));
        assert_eq!(balance.expiring_points, Some(100.5));
        assert_eq!(balance.pending_points, None);
        assert_eq!(mock.last_request().path(), "/api/point");
    }

    #[tokio::test]
    async fn test_balance_sends_ewallet_token() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!({ "Balance": 99.75, "Currency": "THB" }));
        let wallet = WalletUseCase::with_api(logged_in_api(&mock));

        let balance = wallet.balance().await.unwrap();

        assert_eq!(balance.balance, Some(99.75));
        assert_eq!(balance.currency.as_deref(), Some("THB"));
        let request = mock.last_request();
        assert_eq!(request.header("Authorization"), Some("token session-token"));
        assert_eq!(request.header("Ewallet-Token"), Some("wallet-token"));
    }

    #[tokio::test]
    async fn test_balance_without_ewallet_token() {
        let mock = MockHttpClient::new();
        let (api, auth) = test_api(&mock);
        auth.set_token(TokenKind::Token, "session-token".to_string())
            .unwrap();
        let wallet = WalletUseCase::with_api(api);

        let result = wallet.balance().await;

        assert!(matches!(
            result,
            Err(UseCaseError::NotAuthenticated { token }) if token == "ewallet_token"
        ));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_point_log_display() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!([
            { "ID": 1, "Type": "earn", "Title": "Coffee", "Points": 20 },
            { "ID": 2, "Type": "BURN", "Title": "Movie ticket", "Points": 300 }
        ]));
        let wallet = WalletUseCase::with_api(logged_in_api(&mock));

        let entries = wallet
            .point_log_display(Some("202601".to_string()), None, Some(20))
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].display.kind, PointLogKind::Earn);
        assert_eq!(entries[0].display.amount_text, "+20");
        assert_eq!(entries[1].display.kind, PointLogKind::Burn);
        assert_eq!(entries[1].display.amount_text, "-300");
        assert_eq!(entries[1].log.title.as_deref(), Some("Movie ticket"));

        let request = mock.last_request();
        assert_eq!(request.path(), "/api/point/log");
        assert_eq!(request.query("month").as_deref(), Some("202601"));
        assert_eq!(request.query("top").as_deref(), Some("20"));
        assert_eq!(request.query("skip"), None);
    }
}
