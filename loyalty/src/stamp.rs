use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// A stamp card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Stamp {
    /// Stamp card id
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Name
    pub name: Option<String>,
    /// Description
    pub detail: Option<String>,
    /// Stamps collected
    pub current_stamp: Option<i32>,
    /// Stamps needed for the reward
    pub max_stamp: Option<i32>,
    /// Card image path or URL
    pub picture_url: Option<String>,
    /// Expiry, unix seconds
    pub expire_date: Option<i64>,
}

/// One step of a stamp card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct StampSlot {
    /// 1-based position
    pub position: Option<i32>,
    /// Whether the slot is stamped
    pub is_stamped: Option<bool>,
    /// Campaign rewarded at this slot
    #[serde(rename = "RewardCampaignID")]
    pub reward_campaign_id: Option<i64>,
    /// When it was stamped, unix seconds
    pub stamp_date: Option<i64>,
}

/// A stamp card with its slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct StampDetail {
    /// Card fields
    #[serde(flatten)]
    pub stamp: Stamp,
    /// Terms and conditions
    pub condition: Option<String>,
    /// The slots, in order
    pub slots: Vec<StampSlot>,
}

result_callback!(
    /// Receives the stamp cards.
    StampListCallback,
    Vec<Stamp>
);

result_callback!(
    /// Receives a stamp card.
    StampDetailCallback,
    StampDetail
);

/// Stamp cards.
#[derive(uniffi::Object)]
pub struct StampUseCase {
    api: ApiClient,
}

impl StampUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl StampUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// The user's stamp cards.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn list(&self) -> Result<Vec<Stamp>, UseCaseError> {
        self.api.send(ApiRequest::get("/api/stamp")).await
    }

    /// One stamp card.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn detail(&self, stamp_id: i64) -> Result<StampDetail, UseCaseError> {
        self.api
            .send(ApiRequest::get(format!("/api/stamp/{stamp_id}")))
            .await
    }

    /// Callback variant of [`StampUseCase::list`].
    pub fn list_with_callback(self: Arc<Self>, callback: Arc<dyn StampListCallback>) {
        dispatch(callback, async move { self.list().await });
    }

    /// Callback variant of [`StampUseCase::detail`].
    pub fn detail_with_callback(
        self: Arc<Self>,
        stamp_id: i64,
        callback: Arc<dyn StampDetailCallback>,
    ) {
        dispatch(callback, async move { self.detail(stamp_id).await });
    }
}
