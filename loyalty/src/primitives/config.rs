use std::sync::OnceLock;

use crate::localization::Locale;

/// Global configuration for the SDK
static CONFIG_INSTANCE: OnceLock<SdkConfig> = OnceLock::new();

/// Platform environment the SDK talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Staging environment. Response bodies are traced for debugging.
    Staging,
    /// Production environment
    Production,
}

/// Errors raised while validating an [`SdkConfig`].
#[crate::loyalty_error]
pub enum ConfigError {
    /// A required field is empty.
    #[error("missing required config field: {field}")]
    MissingField {
        /// Name of the empty field
        field: String,
    },
    /// A base URL is not an absolute http(s) URL.
    #[error("invalid base url for {field}: {value}")]
    InvalidBaseUrl {
        /// Name of the offending field
        field: String,
        /// The rejected value
        value: String,
    },
}

/// Application-level settings sent with, or used to build, every request.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SdkConfig {
    /// Target environment
    pub environment: Environment,
    /// Platform application id, sent as `App-Id`
    pub app_id: String,
    /// Application name used by dashboard lookups
    pub app_name: String,
    /// API gateway subscription key, sent as `Ocp-Apim-Subscription-Key` when present
    pub subscription_key: Option<String>,
    /// Base URL of the REST API, e.g. `https://api.example.com`
    pub api_base_url: String,
    /// Base URL of the image CDN
    pub image_base_url: String,
    /// Locale (LCID) used until the user picks one
    pub default_locale: i32,
    /// Version of the host app, sent as `Client-Version`
    pub client_version: String,
}

impl SdkConfig {
    /// Validates the config and normalizes base URLs (no trailing slash).
    ///
    /// # Errors
    /// - `ConfigError::MissingField` when `app_id` or `app_name` is blank
    /// - `ConfigError::InvalidBaseUrl` when a base URL is not http(s)
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        for (field, value) in [("app_id", &self.app_id), ("app_name", &self.app_name)] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        self.api_base_url = normalize_base_url("api_base_url", &self.api_base_url)?;
        self.image_base_url = normalize_base_url("image_base_url", &self.image_base_url)?;
        Ok(self)
    }

    /// The configured default locale, falling back to Thai for unknown LCIDs.
    #[must_use]
    pub fn locale(&self) -> Locale {
        Locale::from_lcid(self.default_locale).unwrap_or_default()
    }
}

fn normalize_base_url(field: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidBaseUrl {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Initializes the global SDK configuration.
///
/// Call once at application startup, before any use case runs. Subsequent calls are ignored
/// with a warning.
///
/// # Errors
/// Returns a `ConfigError` if the config does not validate; nothing is stored in that case.
///
/// # Examples
///
/// ## Kotlin
///
/// ```kotlin
/// initSdkConfig(
///     SdkConfig(
///         environment = Environment.PRODUCTION,
///         appId = "1234567890",
///         appName = "myapp",
///         subscriptionKey = BuildConfig.SUBSCRIPTION_KEY,
///         apiBaseUrl = "https://api.example.com",
///         imageBaseUrl = "https://cdn.example.com",
///         defaultLocale = 1054,
///         clientVersion = BuildConfig.VERSION_NAME,
///     )
/// )
/// ```
#[uniffi::export]
pub fn init_sdk_config(config: SdkConfig) -> Result<(), ConfigError> {
    let config = config.validated()?;
    let environment = config.environment;

    match CONFIG_INSTANCE.set(config) {
        Ok(()) => {
            crate::info!("SDK config initialized with environment: {environment}");
        }
        Err(_) => {
            crate::warn!("SDK config already initialized, ignoring");
        }
    }
    Ok(())
}

/// Gets the current environment, defaulting to Production when the SDK is not configured.
#[uniffi::export]
#[must_use]
pub fn current_environment() -> Environment {
    CONFIG_INSTANCE.get().map_or_else(
        || {
            crate::warn!("SDK config not initialized, defaulting to Production");
            Environment::Production
        },
        |config| config.environment,
    )
}

/// Checks if the SDK configuration has been initialized.
#[uniffi::export]
#[must_use]
pub fn is_initialized() -> bool {
    CONFIG_INSTANCE.get().is_some()
}

/// Gets a reference to the global configuration, if initialized.
#[must_use]
pub fn get_config() -> Option<&'static SdkConfig> {
    CONFIG_INSTANCE.get()
}

#[cfg(test)]
pub(crate) fn test_config() -> SdkConfig {
    SdkConfig {
        environment: Environment::Staging,
        app_id: "app-123".to_string(),
        app_name: "loyaltytest".to_string(),
        subscription_key: Some("sub-key".to_string()),
        api_base_url: "https://api.test.local".to_string(),
        image_base_url: "https://cdn.test.local".to_string(),
        default_locale: 1054,
        client_version: "android_app_1.0.0".to_string(),
    }
}
