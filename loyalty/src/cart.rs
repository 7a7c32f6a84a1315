use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback, CountCallback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// How a cart item is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CartMode {
    /// Paid with points
    Point,
    /// Paid with money
    Cash,
    /// Points and money together
    Mixed,
}

/// The cart after an item was added.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct CartSummary {
    /// Cart id
    #[serde(rename = "CartID")]
    pub cart_id: Option<i64>,
    /// Number of items
    pub count: Option<i64>,
    /// Points needed for the whole cart
    pub total_points: Option<f64>,
    /// Price of the whole cart
    pub total_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CartCount {
    count: Option<i64>,
}

result_callback!(
    /// Receives the cart summary.
    CartSummaryCallback,
    CartSummary
);

/// Shopping cart.
#[derive(uniffi::Object)]
pub struct CartUseCase {
    api: ApiClient,
}

impl CartUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl CartUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// Adds `quantity` units of a campaign.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` for a zero quantity, or any other [`UseCaseError`].
    pub async fn add(
        &self,
        campaign_id: i64,
        mode: CartMode,
        quantity: u32,
    ) -> Result<CartSummary, UseCaseError> {
        if quantity == 0 {
            return Err(UseCaseError::InvalidArgument {
                message: "quantity must be at least 1".to_string(),
            });
        }
        self.api
            .send(
                ApiRequest::post("/api/cart/add")
                    .form("id", campaign_id)
                    .form("mode", mode)
                    .form("qty", quantity),
            )
            .await
    }

    /// Number of items in the cart; `0` when the platform sends none.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn count(&self) -> Result<i64, UseCaseError> {
        let count: CartCount = self.api.send(ApiRequest::get("/api/cart/count")).await?;
        Ok(count.count.unwrap_or_default())
    }

    /// Callback variant of [`CartUseCase::add`].
    pub fn add_with_callback(
        self: Arc<Self>,
        campaign_id: i64,
        mode: CartMode,
        quantity: u32,
        callback: Arc<dyn CartSummaryCallback>,
    ) {
        dispatch(callback, async move {
            self.add(campaign_id, mode, quantity).await
        });
    }

    /// Callback variant of [`CartUseCase::count`].
    pub fn count_with_callback(self: Arc<Self>, callback: Arc<dyn CountCallback>) {
        dispatch(callback, async move { self.count().await });
    }
}
