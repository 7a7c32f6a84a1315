use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// Filters for a place search. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct PlaceQuery {
    /// Free-text search
    pub keyword: Option<String>,
    /// Place category, as configured in the back office
    pub category: Option<String>,
    /// Latitude of the user
    pub latitude: Option<f64>,
    /// Longitude of the user
    pub longitude: Option<f64>,
    /// Search radius in kilometres; needs a position
    pub distance: Option<f64>,
    /// Entries to skip
    pub skip: Option<u32>,
    /// Page size
    pub top: Option<u32>,
}

/// A branch or shop.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Place {
    /// Place id
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Name
    pub name: Option<String>,
    /// Description
    pub detail: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Opening hours, free text
    pub open_hours: Option<String>,
    /// Latitude
    pub latitude: Option<f64>,
    /// Longitude
    pub longitude: Option<f64>,
    /// Distance from the searched position, kilometres
    pub distance: Option<f64>,
    /// Image path or URL
    pub picture_url: Option<String>,
}

result_callback!(
    /// Receives places.
    PlaceListCallback,
    Vec<Place>
);

result_callback!(
    /// Receives a place.
    PlaceCallback,
    Place
);

/// Branch and shop lookup.
#[derive(uniffi::Object)]
pub struct PlaceUseCase {
    api: ApiClient,
}

impl PlaceUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl PlaceUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// Places matching `query`.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` when only one coordinate, or a distance without a
    /// position, is given. Otherwise any [`UseCaseError`].
    pub async fn list(&self, query: PlaceQuery) -> Result<Vec<Place>, UseCaseError> {
        if query.latitude.is_some() != query.longitude.is_some() {
            return Err(UseCaseError::InvalidArgument {
                message: "latitude and longitude must be given together".to_string(),
            });
        }
        if query.distance.is_some() && query.latitude.is_none() {
            return Err(UseCaseError::InvalidArgument {
                message: "distance needs a position".to_string(),
            });
        }
        self.api
            .send(
                ApiRequest::get("/api/place")
                    .query_opt("keyword", query.keyword)
                    .query_opt("category", query.category)
                    .query_opt("lat", query.latitude)
                    .query_opt("lng", query.longitude)
                    .query_opt("distance", query.distance)
                    .paging(query.skip, query.top),
            )
            .await
    }

    /// One place.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn detail(&self, place_id: i64) -> Result<Place, UseCaseError> {
        self.api
            .send(ApiRequest::get(format!("/api/place/{place_id}")))
            .await
    }

    /// Callback variant of [`PlaceUseCase::list`].
    pub fn list_with_callback(
        self: Arc<Self>,
        query: PlaceQuery,
        callback: Arc<dyn PlaceListCallback>,
    ) {
        dispatch(callback, async move { self.list(query).await });
    }

    /// Callback variant of [`PlaceUseCase::detail`].
    pub fn detail_with_callback(self: Arc<Self>, place_id: i64, callback: Arc<dyn PlaceCallback>) {
        dispatch(callback, async move { self.detail(place_id).await });
    }
}
