use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback, CompletionCallback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// Status, button and next-step derivation for history rows.
pub mod extractor;

pub use extractor::{
    DisplayStatus, HistoryButtonCatalog, HistoryDisplay, HistoryExtractorConfig, HistoryFamily,
    HistoryNextStep, HistoryStatusKind, StatusStyle,
};

/// One redemption in the user's history.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Purchase {
    /// Purchase id
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Campaign id
    #[serde(rename = "CampaignID")]
    pub campaign_id: Option<i64>,
    /// Campaign name
    #[serde(rename = "Name")]
    pub campaign_name: Option<String>,
    /// Campaign type; `0` is a lucky draw
    #[serde(rename = "Type")]
    pub campaign_type: Option<i32>,
    /// Key identifying this redemption
    pub redeem_key: Option<String>,
    /// Redemption time, as sent by the platform
    pub redeem_date: Option<String>,
    /// Serial (voucher) code
    pub serial: Option<String>,
    /// Points spent
    pub point_per_unit: Option<f64>,
    /// Quantity redeemed
    pub qty: Option<i64>,
    /// Whether the voucher was used
    pub is_used: Option<bool>,
    /// Whether the draw was announced
    pub has_winner: Option<bool>,
    /// Whether the user won the draw
    pub is_winner: Option<bool>,
    /// Whether the reward is delivered physically
    pub delivered: Option<bool>,
    /// Whether the reward was shipped
    pub is_shipped: Option<bool>,
    /// Carrier tracking number
    pub parcel_no: Option<String>,
    /// Voucher expiry, unix seconds; `0` when unknown
    pub voucher_expire_date: Option<i64>,
    /// Seconds until expiry; negative once expired
    pub expire_in: Option<i64>,
    /// Campaign image path or URL
    pub picture_url: Option<String>,
}

/// A purchase and its display projection.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct HistoryEntry {
    /// Raw purchase
    pub purchase: Purchase,
    /// Derived status, button and texts
    pub display: HistoryDisplay,
}

result_callback!(
    /// Receives a page of purchases.
    PurchaseListCallback,
    Vec<Purchase>
);

result_callback!(
    /// Receives a page of history entries.
    HistoryEntryListCallback,
    Vec<HistoryEntry>
);

/// Redemption history.
#[derive(uniffi::Object)]
pub struct HistoryUseCase {
    api: ApiClient,
}

impl HistoryUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl HistoryUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// A page of purchases for a history menu config.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn list(
        &self,
        config: String,
        skip: Option<u32>,
        top: Option<u32>,
    ) -> Result<Vec<Purchase>, UseCaseError> {
        self.api
            .send(
                ApiRequest::get("/api/history")
                    .query("config", config)
                    .paging(skip, top),
            )
            .await
    }

    /// A page of purchases with their display projection, using the process-wide
    /// [`HistoryExtractorConfig`] and the current time.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn list_display(
        &self,
        config: String,
        skip: Option<u32>,
        top: Option<u32>,
    ) -> Result<Vec<HistoryEntry>, UseCaseError> {
        let purchases = self.list(config, skip, top).await?;
        let extractor_config = extractor::current_config();
        let now = chrono::Utc::now().timestamp();

        Ok(purchases
            .into_iter()
            .map(|purchase| {
                let display = extractor::extract(&purchase, &extractor_config, now);
                HistoryEntry { purchase, display }
            })
            .collect())
    }

    /// Marks a redeemed voucher as used.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` for a blank key, or any other [`UseCaseError`].
    pub async fn use_campaign(&self, redeem_key: String) -> Result<(), UseCaseError> {
        let redeem_key = redeem_key.trim();
        if redeem_key.is_empty() {
            return Err(UseCaseError::InvalidArgument {
                message: "redeem_key must not be blank".to_string(),
            });
        }
        self.api
            .send_unit(ApiRequest::post(format!(
                "/api/redeem/{}/use",
                urlencoding::encode(redeem_key)
            )))
            .await
    }

    /// Callback variant of [`HistoryUseCase::list`].
    pub fn list_with_callback(
        self: Arc<Self>,
        config: String,
        skip: Option<u32>,
        top: Option<u32>,
        callback: Arc<dyn PurchaseListCallback>,
    ) {
        dispatch(callback, async move { self.list(config, skip, top).await });
    }

    /// Callback variant of [`HistoryUseCase::list_display`].
    pub fn list_display_with_callback(
        self: Arc<Self>,
        config: String,
        skip: Option<u32>,
        top: Option<u32>,
        callback: Arc<dyn HistoryEntryListCallback>,
    ) {
        dispatch(callback, async move {
            self.list_display(config, skip, top).await
        });
    }

    /// Callback variant of [`HistoryUseCase::use_campaign`].
    pub fn use_campaign_with_callback(
        self: Arc<Self>,
        redeem_key: String,
        callback: Arc<dyn CompletionCallback>,
    ) {
        dispatch(callback, async move { self.use_campaign(redeem_key).await });
    }
}
