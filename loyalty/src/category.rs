use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// A campaign category of a menu config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Category {
    /// Category id, used as `category_id` in campaign lists
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Name
    pub name: Option<String>,
    /// Icon path or URL
    pub picture_url: Option<String>,
    /// Position in the menu
    pub sort: Option<i32>,
    /// Number of active campaigns
    pub campaign_count: Option<i64>,
}

result_callback!(
    /// Receives the categories of a menu config.
    CategoryListCallback,
    Vec<Category>
);

/// Campaign categories.
#[derive(uniffi::Object)]
pub struct CategoryUseCase {
    api: ApiClient,
}

impl CategoryUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl CategoryUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// The categories of a menu config.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn list(&self, config: String) -> Result<Vec<Category>, UseCaseError> {
        self.api
            .send(ApiRequest::get("/api/campaign/category").query("config", config))
            .await
    }

    /// Callback variant of [`CategoryUseCase::list`].
    pub fn list_with_callback(self: Arc<Self>, config: String, callback: Arc<dyn CategoryListCallback>) {
        dispatch(callback, async move { self.list(config).await });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_utils::{logged_in_api, MockHttpClient};

    #[tokio::test]
    async fn test_list() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!([
            { "ID": 3, "Name": "Food", "Sort": 1 },
            { "ID": 4, "Name": "Travel", "CampaignCount": null }
        ]));
        let categories = CategoryUseCase::with_api(logged_in_api(&mock));

        let list = categories.list("campaign_main".to_string()).await.unwrap();

        assert_eq!(
            list[0],
            Category {
                id: Some(3),
                name: Some("Food".to_string()),
                sort: Some(1),
                ..Category::default()
            }
        );
        assert_eq!(list[1].campaign_count, None);
        assert_eq!(
            mock.last_request().url,
            "https://api.test.local/api/campaign/category?config=campaign_main"
        );
    }
}
