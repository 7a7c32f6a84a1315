use std::sync::Arc;

use serde::Deserialize;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::AuthProvider;
use crate::callback::{dispatch, result_callback, CompletionCallback};
use crate::error::UseCaseError;
use crate::loyalty_export;

/// Which notifications to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Enum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationMode {
    /// Every notification
    #[default]
    All,
    /// Only unread ones
    Unread,
    /// Only read ones
    Read,
}

/// Ordering of a notification list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Enum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationSort {
    /// Newest first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
}

/// An in-app notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(rename_all = "PascalCase", default)]
pub struct Notification {
    /// Notification id
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    /// Title
    pub title: Option<String>,
    /// Body text
    pub detail: Option<String>,
    /// Kind of notification, as sent by the platform
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    /// Deep link or reference the app should open
    pub reference: Option<String>,
    /// Image path or URL
    pub picture_url: Option<String>,
    /// Whether the user has read it
    pub is_read: Option<bool>,
    /// When it was sent, unix seconds
    pub create_date: Option<i64>,
}

result_callback!(
    /// Receives notifications.
    NotificationListCallback,
    Vec<Notification>
);

/// In-app notifications.
#[derive(uniffi::Object)]
pub struct NotificationUseCase {
    api: ApiClient,
}

impl NotificationUseCase {
    pub(crate) const fn with_api(api: ApiClient) -> Self {
        Self { api }
    }
}

#[loyalty_export]
impl NotificationUseCase {
    /// Creates the use case.
    #[uniffi::constructor]
    pub fn new(auth: Arc<AuthProvider>) -> Self {
        Self::with_api(ApiClient::new(auth))
    }

    /// The user's notifications.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn list(
        &self,
        mode: NotificationMode,
        sort_by: NotificationSort,
    ) -> Result<Vec<Notification>, UseCaseError> {
        self.api
            .send(
                ApiRequest::get("/api/noti")
                    .query("mode", mode)
                    .query("sortby", sort_by),
            )
            .await
    }

    /// Marks notifications as read. An empty list sends nothing.
    ///
    /// # Errors
    /// Any [`UseCaseError`].
    pub async fn mark_read(&self, ids: Vec<i64>) -> Result<(), UseCaseError> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.api
            .send_unit(ApiRequest::post("/api/noti/read").form("ids", ids))
            .await
    }

    /// Callback variant of [`NotificationUseCase::list`].
    pub fn list_with_callback(
        self: Arc<Self>,
        mode: NotificationMode,
        sort_by: NotificationSort,
        callback: Arc<dyn NotificationListCallback>,
    ) {
        dispatch(callback, async move { self.list(mode, sort_by).await });
    }

    /// Callback variant of [`NotificationUseCase::mark_read`].
    pub fn mark_read_with_callback(
        self: Arc<Self>,
        ids: Vec<i64>,
        callback: Arc<dyn CompletionCallback>,
    ) {
        dispatch(callback, async move { self.mark_read(ids).await });
    }
}
