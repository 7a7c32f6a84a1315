#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs, dead_code)]

//! `loyalty` is the client SDK for the loyalty platform REST API: login and session tokens,
//! campaigns and redemption, purchase history, points and e-wallet, stamps, notifications and
//! the lookups around them.
//!
//! It is exported to Kotlin and Swift through UniFFI. The host app provides three things before
//! calling any use case:
//!
//! 1. the configuration, through [`primitives::init_sdk_config`]
//! 2. a native HTTP client, through [`primitives::set_http_client`]
//! 3. a durable key-value store, passed to [`auth::AuthProvider::new`]
//!
//! Every use case exposes each operation twice: as an `async` function and as a
//! `*_with_callback` variant that reports through a foreign callback interface.

/// Host-provided building blocks: configuration, HTTP transport, storage, logging and URLs.
pub mod primitives;

/// Errors returned by use cases and their foreign-facing form.
pub mod error;

/// Placeholder substitution and the supported display languages.
pub mod localization;

/// Callback interfaces and the runtime delivering results to them.
pub mod callback;

/// Token storage, request authentication and the login flows.
pub mod auth;

mod api;

/// Campaign catalogue, redemption and favourites.
pub mod campaign;

/// Campaign categories.
pub mod category;

/// Shopping cart.
pub mod cart;

/// Purchase history and its display projection.
pub mod history;

/// Stamp cards.
pub mod stamp;

/// Points, e-wallet balance and the point log.
pub mod wallet;

/// In-app notifications.
pub mod notification;

/// Back-office configured dashboards.
pub mod dashboard;

/// Branch and shop lookup.
pub mod place;

/// Thai address lookups.
pub mod zipcode;

/// The member profile.
pub mod profile;

/// Requests to endpoints without a dedicated use case.
pub mod custom_api;

#[cfg(test)]
mod test_utils;

pub use loyalty_macros::{loyalty_error, loyalty_export};

uniffi::setup_scaffolding!("loyalty");
