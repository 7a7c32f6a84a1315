/// Application configuration set once at startup.
pub mod config;

/// The native HTTP transport and its errors.
pub mod http_client;

/// Durable key-value storage provided by the host app.
pub mod key_value_store;

/// Forwards SDK logs to the host app.
pub mod logger;

/// URL, query-string and form-body construction.
pub mod url;

pub use config::{init_sdk_config, Environment, SdkConfig};
pub use http_client::{
    set_http_client, HttpError, HttpHeader, HttpMethod, LoyaltyHttpClient,
};
pub use key_value_store::{DeviceKeyValueStore, KeyValueStoreError};
