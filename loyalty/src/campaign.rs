use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback, CompletionCallback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// A campaign as listed in a catalogue.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Campaign {
    /// Campaign id
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Name
    pub name: Option<String>,
    /// Short description
    pub detail: Option<String>,
    /// Category id
    #[serde(rename = "CategoryID")]
    pub category_id: Option<i64>,
    /// Campaign type; `0` is a lucky draw
    #[serde(rename = "Type")]
    pub campaign_type: Option<i32>,
    /// Points needed per unit
    pub point_per_unit: Option<f64>,
    /// Price in the local currency, for paid campaigns
    pub price: Option<f64>,
    /// Units left
    pub qty: Option<i64>,
    /// Units redeemed so far
    pub redeem_count: Option<i64>,
    /// Whether the user marked it as favourite
    pub is_favourite: Option<bool>,
    /// Start of the campaign, unix seconds
    pub start_date: Option<i64>,
    /// End of the campaign, unix seconds
    pub end_date: Option<i64>,
    /// Last modification, unix seconds; use it as the image version
    pub modify_date: Option<i64>,
    /// Cover image path or URL
    pub picture_url: Option<String>,
}

/// A campaign with everything its detail screen shows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct CampaignDetail {
    /// Catalogue fields
    #[serde(flatten)]
    pub campaign: Campaign,
    /// Terms and conditions
    pub condition: Option<String>,
    /// Additional images
    pub pictures: Option<Vec<String>>,
    /// Whether the user can redeem it now
    pub can_redeem: Option<bool>,
    /// Why the user cannot redeem it, when `can_redeem` is false
    pub status_message: Option<String>,
    /// Redemptions allowed per user
    pub user_limit: Option<i64>,
    /// Redemptions the user already made
    pub user_redeem_count: Option<i64>,
    /// Whether the reward is delivered physically
    pub delivered: Option<bool>,
}

/// Result of a redemption.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct RedeemResult {
    /// Key identifying the redemption, used by history operations
    pub redeem_key: Option<String>,
    /// Serial (voucher) code, when issued immediately
    pub serial: Option<String>,
    /// Reference code shown to staff
    pub ref_code: Option<String>,
    /// Points left after the redemption
    pub points: Option<f64>,
}

result_callback!(
    /// Receives a page of campaigns.
    CampaignListCallback,
    Vec<Campaign>
);

result_callback!(
    /// Receives a campaign detail.
    CampaignDetailCallback,
    CampaignDetail
);

result_callback!(
    /// Receives a redemption result.
    RedeemCallback,
    RedeemResult
);

/// Campaign catalogue, redemption and favourites.
#[derive(uniffi::Object)]
pub struct CampaignUseCase {
    api: ApiClient,
}

impl CampaignUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

fn favourite_path(campaign_id: i64) -> String {
    format!("/api/campaign/{campaign_id}/favourite")
}

#[loyalty_export]
impl CampaignUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// A page of campaigns for a menu config, optionally in one category.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn list(
        &self,
        config: String,
        category_id: Option<i64>,
        skip: Option<u32>,
        top: Option<u32>,
    ) -> Result<Vec<Campaign>, UseCaseError> {
        self.api
            .send(
                ApiRequest::get("/api/campaign")
                    .query("config", config)
                    .query_opt("cat", category_id)
                    .paging(skip, top),
            )
            .await
    }

    /// One campaign.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn detail(&self, campaign_id: i64) -> Result<CampaignDetail, UseCaseError> {
        self.api
            .send(ApiRequest::get(format!("/api/campaign/{campaign_id}")))
            .await
    }

    /// Redeems a campaign.
    ///
    /// # Errors
    /// Any [`UseCaseError`]; sold-out and not-enough-points come back as `UseCaseError::Api`.
    pub async fn redeem(&self, campaign_id: i64) -> Result<RedeemResult, UseCaseError> {
        self.api
            .send(ApiRequest::post(format!("/api/campaign/{campaign_id}/redeem")))
            .await
    }

    /// Marks a campaign as favourite.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn add_favourite(&self, campaign_id: i64) -> Result<(), UseCaseError> {
        self.api
            .send_unit(ApiRequest::post(favourite_path(campaign_id)))
            .await
    }

    /// Removes a campaign from the favourites.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn remove_favourite(&self, campaign_id: i64) -> Result<(), UseCaseError> {
        self.api
            .send_unit(ApiRequest::delete(favourite_path(campaign_id)))
            .await
    }

    /// A page of the user's favourite campaigns.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn favourites(
        &self,
        skip: Option<u32>,
        top: Option<u32>,
    ) -> Result<Vec<Campaign>, UseCaseError> {
        self.api
            .send(ApiRequest::get("/api/campaign/favourite").paging(skip, top))
            .await
    }

    /// Callback variant of [`CampaignUseCase::list`].
    pub fn list_with_callback(
        self: Arc<Self>,
        config: String,
        category_id: Option<i64>,
        skip: Option<u32>,
        top: Option<u32>,
        callback: Arc<dyn CampaignListCallback>,
    ) {
        dispatch(callback, async move {
            self.list(config, category_id, skip, top).await
        });
    }

    /// Callback variant of [`CampaignUseCase::detail`].
    pub fn detail_with_callback(
        self: Arc<Self>,
        campaign_id: i64,
        callback: Arc<dyn CampaignDetailCallback>,
    ) {
        dispatch(callback, async move { self.detail(campaign_id).await });
    }

    /// Callback variant of [`CampaignUseCase::redeem`].
    pub fn redeem_with_callback(
        self: Arc<Self>,
        campaign_id: i64,
        callback: Arc<dyn RedeemCallback>,
    ) {
        dispatch(callback, async move { self.redeem(campaign_id).await });
    }

    /// Callback variant of [`CampaignUseCase::add_favourite`].
    pub fn add_favourite_with_callback(
        self: Arc<Self>,
        campaign_id: i64,
        callback: Arc<dyn CompletionCallback>,
    ) {
        dispatch(callback, async move { self.add_favourite(campaign_id).await });
    }

    /// Callback variant of [`CampaignUseCase::remove_favourite`].
    pub fn remove_favourite_with_callback(
        self: Arc<Self>,
        campaign_id: i64,
        callback: Arc<dyn CompletionCallback>,
    ) {
        dispatch(callback, async move {
            self.remove_favourite(campaign_id).await
        });
    }

    /// Callback variant of [`CampaignUseCase::favourites`].
    pub fn favourites_with_callback(
        self: Arc<Self>,
        skip: Option<u32>,
        top: Option<u32>,
        callback: Arc<dyn CampaignListCallback>,
    ) {
        dispatch(callback, async move { self.favourites(skip, top).await });
    }
}
