use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// A tile of a dashboard screen.
///
/// `kind` and `reference` tell the app what to open when the tile is tapped, e.g. a campaign id,
/// a category config or a web URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Dashboard {
    /// Tile id
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Title
    pub name: Option<String>,
    /// Subtitle
    pub detail: Option<String>,
    /// What the tile opens
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    /// Target of the tile, interpreted according to `kind`
    pub reference: Option<String>,
    /// Image path or URL
    pub picture_url: Option<String>,
    /// Layout size hint
    pub size: Option<String>,
    /// Position on the screen
    pub sort: Option<i32>,
    /// Sub-dashboard opened by the tile, if any
    pub sub_dashboard: Option<String>,
}

result_callback!(
    /// Receives dashboard tiles.
    DashboardListCallback,
    Vec<Dashboard>
);

/// Home screen dashboards configured in the back office.
#[derive(uniffi::Object)]
pub struct DashboardUseCase {
    api: ApiClient,
}

impl DashboardUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }

    async fn fetch(&self, path: &str, dashboard_name: String) -> Result<Vec<Dashboard>, UseCaseError> {
        let app = self.api.config()?.app_name.clone();
        self.api
            .send(
                ApiRequest::get(path)
                    .query("app", app)
                    .query("name", dashboard_name),
            )
            .await
    }
}

#[loyalty_export]
impl DashboardUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// Tiles of a main dashboard.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn main(&self, dashboard_name: String) -> Result<Vec<Dashboard>, UseCaseError> {
        self.fetch("/api/dashboard/main", dashboard_name).await
    }

    /// Tiles of a sub-dashboard.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn sub(&self, dashboard_name: String) -> Result<Vec<Dashboard>, UseCaseError> {
        self.fetch("/api/dashboard/sub", dashboard_name).await
    }

    /// Callback variant of [`DashboardUseCase::main`].
    pub fn main_with_callback(
        self: Arc<Self>,
        dashboard_name: String,
        callback: Arc<dyn DashboardListCallback>,
    ) {
        dispatch(callback, async move { self.main(dashboard_name).await });
    }

    /// Callback variant of [`DashboardUseCase::sub`].
    pub fn sub_with_callback(
        self: Arc<Self>,
        dashboard_name: String,
        callback: Arc<dyn DashboardListCallback>,
    ) {
        dispatch(callback, async move { self.sub(dashboard_name).await });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_utils::{logged_in_api, MockHttpClient};

    #[tokio::test]
    async fn test_main_and_sub() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!([
            { "ID": 1, "Type": "campaign", "Reference": "42", "SubDashboard": "promo" }
        ]));
        mock.respond_json(json!([]));
        let dashboards = DashboardUseCase::with_api(logged_in_api(&mock));

        let main = dashboards.main("home".to_string()).await.unwrap();
        let sub = dashboards.sub("promo".to_string()).await.unwrap();

        assert_eq!(main[0].reference.as_deref(), Some("42"));
        assert_eq!(main[0].sub_dashboard.as_deref(), Some("promo"));
        assert!(sub.is_empty());
        let requests = mock.requests();
        assert_eq!(
            requests[0].url,
            "https://api.test.local/api/dashboard/main?app=loyaltytest&name=home"
        );
        assert_eq!(requests[1].path(), "/api/dashboard/sub");
        assert_eq!(requests[1].query("name").as_deref(), Some("promo"));
    }
}
