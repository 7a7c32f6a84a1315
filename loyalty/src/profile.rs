use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// The member profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Profile {
    /// Member id
    #[serde(rename = "UserID")]
    pub user_id: Option<i64>,
    /// Member code printed on the card
    pub member_code: Option<String>,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Birth date, unix seconds
    pub birth_date: Option<i64>,
    /// Gender code as used by the platform
    pub gender: Option<String>,
    /// Address line
    pub address: Option<String>,
    /// Sub-district code
    pub sub_district_code: Option<String>,
    /// Zipcode
    pub zipcode: Option<String>,
    /// Avatar path or URL
    pub picture_url: Option<String>,
    /// Current points
    pub points: Option<f64>,
    /// Member level name
    pub level: Option<String>,
}

/// Profile fields to change. Fields left `None` are not sent and stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct ProfileUpdate {
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Birth date, unix seconds
    pub birth_date: Option<i64>,
    /// Gender code
    pub gender: Option<String>,
    /// Address line
    pub address: Option<String>,
    /// Sub-district code
    pub sub_district_code: Option<String>,
    /// Zipcode
    pub zipcode: Option<String>,
}

impl ProfileUpdate {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn into_request(self) -> ApiRequest {
        ApiRequest::put("/api/profile")
            .form_opt("firstname", self.first_name)
            .form_opt("lastname", self.last_name)
            .form_opt("displayname", self.display_name)
            .form_opt("email", self.email)
            .form_opt("phone", self.phone)
            .form_opt("birthdate", self.birth_date)
            .form_opt("gender", self.gender)
            .form_opt("address", self.address)
            .form_opt("subdistrict", self.sub_district_code)
            .form_opt("zipcode", self.zipcode)
    }
}

result_callback!(
    /// Receives the profile.
    ProfileCallback,
    Profile
);

/// The member profile.
#[derive(uniffi::Object)]
pub struct ProfileUseCase {
    api: ApiClient,
}

impl ProfileUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl ProfileUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// The logged-in member's profile.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn profile(&self) -> Result<Profile, UseCaseError> {
        self.api.send(ApiRequest::get("/api/profile")).await
    }

    /// Changes profile fields and returns the updated profile.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` when nothing is set, or any other [`UseCaseError`].
    pub async fn update(&self, update: ProfileUpdate) -> Result<Profile, UseCaseError> {
        if update.is_empty() {
            return Err(UseCaseError::InvalidArgument {
                message: "profile update has no fields".to_string(),
            });
        }
        self.api.send(update.into_request()).await
    }

    /// Callback variant of [`ProfileUseCase::profile`].
    pub fn profile_with_callback(self: Arc<Self>, callback: Arc<dyn ProfileCallback>) {
        dispatch(callback, async move { self.profile().await });
    }

    /// Callback variant of [`ProfileUseCase::update`].
    pub fn update_with_callback(
        self: Arc<Self>,
        update: ProfileUpdate,
        callback: Arc<dyn ProfileCallback>,
    ) {
        dispatch(callback, async move { self.update(update).await });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::primitives::http_client::HttpMethod;
    use crate::test_utils::{logged_in_api, MockHttpClient};

    #[tokio::test]
    async fn test_profile() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!({
            "UserID": 99,
            "FirstName": "Somchai",
            "Points": 1250.5,
            "Level": "Gold"
        }));
        let profiles = ProfileUseCase::with_api(logged_in_api(&mock));

        let profile = profiles.profile().await.unwrap();

        assert_eq!(profile.user_id, Some(99));
        assert_eq!(profile.level.as_deref(), Some("Gold"));
        assert_eq!(profile.email, None);
        assert_eq!(mock.last_request().method, HttpMethod::Get);
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let mock = MockHttpClient::new();
        mock.respond_json(json!({ "Email": "new@example.com", "Zipcode": "10330" }));
        let profiles = ProfileUseCase::with_api(logged_in_api(&mock));

        let profile = profiles
            .update(ProfileUpdate {
                email: Some("new@example.com".to_string()),
                zipcode: Some("10330".to_string()),
                ..ProfileUpdate::default()
            })
            .await
            .unwrap();

        assert_eq!(profile.zipcode.as_deref(), Some("10330"));
        let request = mock.last_request();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path(), "/api/profile");
        assert_eq!(
            request.body_text().as_deref(),
            Some("email=new%40example.com&zipcode=10330")
        );
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let mock = MockHttpClient::new();
        let profiles = ProfileUseCase::with_api(logged_in_api(&mock));

        let result = profiles.update(ProfileUpdate::default()).await;

        assert!(matches!(result, Err(UseCaseError::InvalidArgument { .. })));
        assert!(mock.requests().is_empty());
    }
}
