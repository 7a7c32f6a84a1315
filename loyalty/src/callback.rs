//! Callback-style delivery for apps that do not use `suspend`/`async`.
//!
//! Every use-case operation has a `*_with_callback` twin that returns immediately, runs the
//! operation on the SDK's own runtime and reports to a foreign callback. Each result type gets
//! its own callback interface, generated by [`result_callback!`], with `on_success(value)` and
//! `on_error(ApiError)`.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;

use crate::error::{ApiError, UseCaseError};
use crate::warn;

static RUNTIME: OnceCell<Runtime> = OnceCell::new();

const WORKER_THREADS: usize = 2;

fn runtime() -> Result<&'static Runtime, UseCaseError> {
    RUNTIME
        .get_or_try_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(WORKER_THREADS)
                .thread_name("loyalty-callback")
                .enable_all()
                .build()
                .context("failed to start the callback runtime")
        })
        .map_err(UseCaseError::from)
}

/// Receives the outcome of one operation.
pub(crate) trait ResultCallback<T>: Send + Sync {
    fn deliver(&self, result: Result<T, UseCaseError>);
}

/// Runs `future` on the SDK runtime and hands its result to `callback`.
pub(crate) fn dispatch<T, C, F>(callback: Arc<C>, future: F)
where
    T: 'static,
    C: ResultCallback<T> + ?Sized + 'static,
    F: Future<Output = Result<T, UseCaseError>> + Send + 'static,
{
    match runtime() {
        Ok(runtime) => {
            runtime.spawn(async move {
                callback.deliver(future.await);
            });
        }
        Err(e) => {
            warn!("cannot run callback operation: {e}");
            callback.deliver(Err(e));
        }
    }
}

/// Declares a foreign callback interface for one result type.
macro_rules! result_callback {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        #[uniffi::export(with_foreign)]
        pub trait $name: Send + Sync {
            /// Called once with the result.
            fn on_success(&self, result: $ty);
            /// Called once with the failure.
            fn on_error(&self, error: $crate::error::ApiError);
        }

        impl $crate::callback::ResultCallback<$ty> for dyn $name {
            fn deliver(&self, result: Result<$ty, $crate::error::UseCaseError>) {
                match result {
                    Ok(value) => self.on_success(value),
                    Err(error) => self.on_error(error.into()),
                }
            }
        }
    };
}

pub(crate) use result_callback;

/// Callback for operations that return nothing.
#[uniffi::export(with_foreign)]
pub trait CompletionCallback: Send + Sync {
    /// Called once when the operation succeeded.
    fn on_success(&self);
    /// Called once with the failure.
    fn on_error(&self, error: ApiError);
}

impl ResultCallback<()> for dyn CompletionCallback {
    fn deliver(&self, result: Result<(), UseCaseError>) {
        match result {
            Ok(()) => self.on_success(),
            Err(error) => self.on_error(error.into()),
        }
    }
}

result_callback!(
    /// Callback receiving a raw JSON string.
    StringCallback,
    String
);

result_callback!(
    /// Callback receiving a count.
    CountCallback,
    i64
);
