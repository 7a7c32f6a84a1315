//! Thai address lookups used by address forms.
//!
//! These calls only need the app credentials, so they work before login.

use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::{AuthProvider, RequestAuth};
use crate::callback::{dispatch, result_callback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// A sub-district reachable through a zipcode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct ZipcodeArea {
    /// Five-digit zipcode
    pub zipcode: Option<String>,
    /// Province code
    pub province_code: Option<String>,
    /// Province name
    pub province_name: Option<String>,
    /// District code
    pub district_code: Option<String>,
    /// District name
    pub district_name: Option<String>,
    /// Sub-district code
    pub sub_district_code: Option<String>,
    /// Sub-district name
    pub sub_district_name: Option<String>,
}

/// A province.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Province {
    /// Province code
    pub code: Option<String>,
    /// Name in the request language
    pub name: Option<String>,
}

/// A district of a province.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct District {
    /// District code
    pub code: Option<String>,
    /// Name in the request language
    pub name: Option<String>,
    /// Province it belongs to
    pub province_code: Option<String>,
}

/// A sub-district of a district.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct SubDistrict {
    /// Sub-district code
    pub code: Option<String>,
    /// Name in the request language
    pub name: Option<String>,
    /// District it belongs to
    pub district_code: Option<String>,
    /// Zipcode of the sub-district
    pub zipcode: Option<String>,
}

result_callback!(
    /// Receives the areas of a zipcode.
    ZipcodeAreaListCallback,
    Vec<ZipcodeArea>
);

result_callback!(
    /// Receives provinces.
    ProvinceListCallback,
    Vec<Province>
);

result_callback!(
    /// Receives districts.
    DistrictListCallback,
    Vec<District>
);

result_callback!(
    /// Receives sub-districts.
    SubDistrictListCallback,
    Vec<SubDistrict>
);

fn is_zipcode(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

fn require_code(name: &str, value: &str) -> Result<(), UseCaseError> {
    if value.trim().is_empty() {
        return Err(UseCaseError::InvalidArgument {
            message: format!("{name} must not be blank"),
        });
    }
    Ok(())
}

/// Zipcode, province, district and sub-district lookups.
#[derive(uniffi::Object)]
pub struct ZipcodeUseCase {
    api: ApiClient,
}

impl ZipcodeUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl ZipcodeUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// Every sub-district served by a zipcode.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` unless `zipcode` is five digits, or any other
    /// [`UseCaseError`].
    pub async fn lookup(&self, zipcode: String) -> Result<Vec<ZipcodeArea>, UseCaseError> {
        let zipcode = zipcode.trim();
        if !is_zipcode(zipcode) {
            return Err(UseCaseError::InvalidArgument {
                message: format!("invalid zipcode: {zipcode}"),
            });
        }
        self.api
            .send(ApiRequest::get(format!("/api/zipcode/{zipcode}")).auth(RequestAuth::App))
            .await
    }

    /// All provinces.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn provinces(&self) -> Result<Vec<Province>, UseCaseError> {
        self.api
            .send(ApiRequest::get("/api/province").auth(RequestAuth::App))
            .await
    }

    /// Districts of a province.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` for a blank code, or any other [`UseCaseError`].
    pub async fn districts(&self, province_code: String) -> Result<Vec<District>, UseCaseError> {
        require_code("province_code", &province_code)?;
        self.api
            .send(
                ApiRequest::get("/api/district")
                    .auth(RequestAuth::App)
                    .query("province", province_code),
            )
            .await
    }

    /// Sub-districts of a district.
    ///
    /// # Errors
    /// `UseCaseError::InvalidArgument` for a blank code, or any other [`UseCaseError`].
    pub async fn sub_districts(
        &self,
        district_code: String,
    ) -> Result<Vec<SubDistrict>, UseCaseError> {
        require_code("district_code", &district_code)?;
        self.api
            .send(
                ApiRequest::get("/api/subdistrict")
                    .auth(RequestAuth::App)
                    .query("district", district_code),
            )
            .await
    }

    /// Callback variant of [`ZipcodeUseCase::lookup`].
    pub fn lookup_with_callback(
        self: Arc<Self>,
        zipcode: String,
        callback: Arc<dyn ZipcodeAreaListCallback>,
    ) {
        dispatch(callback, async move { self.lookup(zipcode).await });
    }

    /// Callback variant of [`ZipcodeUseCase::provinces`].
    pub fn provinces_with_callback(self: Arc<Self>, callback: Arc<dyn ProvinceListCallback>) {
        dispatch(callback, async move { self.provinces().await });
    }

    /// Callback variant of [`ZipcodeUseCase::districts`].
    pub fn districts_with_callback(
        self: Arc<Self>,
        province_code: String,
        callback: Arc<dyn DistrictListCallback>,
    ) {
        dispatch(callback, async move { self.districts(province_code).await });
    }

    /// Callback variant of [`ZipcodeUseCase::sub_districts`].
    pub fn sub_districts_with_callback(
        self: Arc<Self>,
        district_code: String,
        callback: Arc<dyn SubDistrictListCallback>,
    ) {
        dispatch(callback, async move {
            self.sub_districts(district_code).await
        });
    }
}
