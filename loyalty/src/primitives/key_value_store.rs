#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::Mutex;

use thiserror::Error;

/// Failures reported by the host app's key-value store.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Error, uniffi::Error)]
pub enum KeyValueStoreError {
    /// Nothing is stored under the key
    #[error("key not found")]
    KeyNotFound,
    /// A value exists but could not be read back as a string
    #[error("stored value is unreadable")]
    ParsingFailure,
    /// The write or delete did not persist
    #[error("store update failed")]
    UpdateFailure,
    /// The native implementation threw something the bindings do not know
    #[error("native store failed: {reason}")]
    UnexpectedUniFFICallbackError {
        /// Message of the native exception
        reason: String,
    },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for KeyValueStoreError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError { reason: e.reason }
    }
}

/// Durable string storage provided by the host app.
///
/// Android backs this with `SharedPreferences`, iOS with `UserDefaults`. The SDK keeps session
/// tokens and the locale preference here, namespaced under `loyalty.`. The store is plain
/// key-value storage; apps that need encryption at rest should back it with
/// `EncryptedSharedPreferences` or the Keychain.
#[uniffi::export(with_foreign)]
pub trait DeviceKeyValueStore: Send + Sync {
    /// The value stored under `key`.
    ///
    /// # Errors
    /// `KeyNotFound` when nothing is stored, `ParsingFailure` when the value is unreadable.
    fn get(&self, key: String) -> Result<String, KeyValueStoreError>;

    /// Stores `value` under `key`, replacing what was there.
    ///
    /// # Errors
    /// `UpdateFailure` when the write does not persist.
    fn set(&self, key: String, value: String) -> Result<(), KeyValueStoreError>;

    /// Removes `key`.
    ///
    /// # Errors
    /// `KeyNotFound` when nothing is stored, `UpdateFailure` when the delete does not persist.
    fn delete(&self, key: String) -> Result<(), KeyValueStoreError>;
}

/// Convenience reads and deletes that treat a missing key as a normal outcome.
pub trait KeyValueStoreExt {
    /// Reads `key`, mapping `KeyNotFound` to `None`.
    ///
    /// # Errors
    /// Any store error other than `KeyNotFound`.
    fn get_optional(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Deletes `key`, ignoring `KeyNotFound`. Returns whether a value was removed.
    ///
    /// # Errors
    /// Any store error other than `KeyNotFound`.
    fn delete_if_present(&self, key: &str) -> Result<bool, KeyValueStoreError>;
}

impl<S: DeviceKeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn get_optional(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        match self.get(key.to_string()) {
            Ok(value) => Ok(Some(value)),
            Err(KeyValueStoreError::KeyNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn delete_if_present(&self, key: &str) -> Result<bool, KeyValueStoreError> {
        match self.delete(key.to_string()) {
            Ok(()) => Ok(true),
            Err(KeyValueStoreError::KeyNotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// `HashMap`-backed store for unit tests.
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryDeviceKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

#[cfg(test)]
impl InMemoryDeviceKeyValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }
}

#[cfg(test)]
impl DeviceKeyValueStore for InMemoryDeviceKeyValueStore {
    fn get(&self, key: String) -> Result<String, KeyValueStoreError> {
        let values = self.values.lock().unwrap();
        values.get(&key).cloned().ok_or(KeyValueStoreError::KeyNotFound)
    }

    fn set(&self, key: String, value: String) -> Result<(), KeyValueStoreError> {
        self.values.lock().unwrap().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: String) -> Result<(), KeyValueStoreError> {
        match self.values.lock().unwrap().remove(&key) {
            Some(_) => Ok(()),
            None => Err(KeyValueStoreError::KeyNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_optional_maps_missing_key_to_none() {
        let store = InMemoryDeviceKeyValueStore::new();
        assert_eq!(store.get_optional("missing").unwrap(), None);

        store.set("present".to_string(), "value".to_string()).unwrap();
        assert_eq!(store.get_optional("present").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_delete_if_present() {
        let store = InMemoryDeviceKeyValueStore::new();
        store.set("key".to_string(), "value".to_string()).unwrap();

        assert!(store.delete_if_present("key").unwrap());
        assert!(!store.delete_if_present("key").unwrap());
        assert_eq!(store.len(), 0);
    }

    struct BrokenStore;

    impl DeviceKeyValueStore for BrokenStore {
        fn get(&self, _key: String) -> Result<String, KeyValueStoreError> {
            Err(KeyValueStoreError::ParsingFailure)
        }

        fn set(&self, _key: String, _value: String) -> Result<(), KeyValueStoreError> {
            Err(KeyValueStoreError::UpdateFailure)
        }

        fn delete(&self, _key: String) -> Result<(), KeyValueStoreError> {
            Err(KeyValueStoreError::UpdateFailure)
        }
    }

    #[test]
    fn test_other_errors_propagate() {
        assert!(matches!(
            BrokenStore.get_optional("key"),
            Err(KeyValueStoreError::ParsingFailure)
        ));
        assert!(matches!(
            BrokenStore.delete_if_present("key"),
            Err(KeyValueStoreError::UpdateFailure)
        ));
    }
}
