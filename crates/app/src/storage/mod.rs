//! Persistent key-value mirror
//!
//! A string-to-string map that survives restarts, the terminal counterpart of
//! browser local storage. Values are JSON documents; callers own their key
//! namespaces (`cart`, `timer_<order id>`, `session`).

use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::broadcast;
use tracing::warn;

mod errors;
mod file;
mod memory;

pub use errors::StorageError;
pub use file::FileStore;
pub(crate) use file::replace_file;
pub use memory::MemoryStore;

/// Capacity of the storage-change broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Storage-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that was written or removed; `None` when the whole store was cleared.
    pub key: Option<String>,
}

impl StorageEvent {
    pub(crate) fn key(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
        }
    }

    pub(crate) fn cleared() -> Self {
        Self { key: None }
    }
}

#[automock]
pub trait KeyValueStore: Send + Sync {
    /// Read a raw value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a raw value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, in ascending order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), StorageError>;

    /// Subscribe to change notifications for writes made through this store.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// JSON helpers layered over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and decode a value. Missing, unreadable and unparseable values all
    /// read as `None`.
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key, %error, "failed to read local storage");

                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "ignoring unparseable local storage value");

                None
            }
        }
    }

    /// Encode and write a value.
    ///
    /// # Errors
    ///
    /// Returns an error when encoding or the underlying write fails.
    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(StorageError::Encoding)?;

        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn read_json_round_trips_written_value() -> TestResult {
        let store = MemoryStore::new();

        store.write_json("sample", &Sample { value: 7 })?;

        assert_eq!(store.read_json::<Sample>("sample"), Some(Sample { value: 7 }));

        Ok(())
    }

    #[test]
    fn read_json_treats_garbage_as_absent() -> TestResult {
        let store = MemoryStore::new();

        store.set("sample", "{not json")?;

        assert_eq!(store.read_json::<Sample>("sample"), None);

        Ok(())
    }

    #[test]
    fn read_json_treats_read_failure_as_absent() {
        let mut store = MockKeyValueStore::new();

        store
            .expect_get()
            .once()
            .returning(|_| Err(StorageError::Io(std::io::Error::other("disk gone"))));

        assert_eq!(store.read_json::<Sample>("sample"), None);
    }
}
