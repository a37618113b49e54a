//! Local document backend
//!
//! Stand-in for the hosted document database: named collections of JSON
//! documents keyed by id, optionally saved to a single JSON file after every
//! write. Services build their typed views (menu, orders, ratings, users) on
//! top of this handle the same way they would on a remote client.

use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    storage::replace_file,
    sync::{read, write},
};

mod errors;

pub use errors::DocumentError;

/// Collection names shared with the hosted database.
pub mod collections {
    pub const MENU: &str = "menu";
    pub const ORDERS: &str = "ordersHistory";
    pub const RATINGS: &str = "ratings";
    pub const USERS: &str = "users";
    pub const SPECIAL_USERS: &str = "specialUsers";
    pub const ACCOUNTS: &str = "accounts";
}

const CHANGE_CAPACITY: usize = 64;

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// A write to some document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    pub collection: String,
    pub id: String,
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    collections: RwLock<Collections>,
    changes: broadcast::Sender<DocumentChange>,
}

/// Cheaply cloneable handle to the document backend.
#[derive(Debug, Clone)]
pub struct Documents {
    inner: Arc<Inner>,
}

impl Documents {
    /// A backend that forgets everything when the last handle is dropped.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_state(None, Collections::new())
    }

    /// Open the backend stored at `path`, creating it on first write.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();

        let collections = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Collections::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(DocumentError::Corrupt)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => Collections::new(),
            Err(error) => return Err(error.into()),
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(Self::with_state(Some(path), collections))
    }

    fn with_state(path: Option<PathBuf>, collections: Collections) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                path,
                collections: RwLock::new(collections),
                changes,
            }),
        }
    }

    /// Store a document under a freshly generated id and return that id.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be encoded or saved.
    pub fn insert<T: Serialize>(
        &self,
        collection: &'static str,
        document: &T,
    ) -> Result<String, DocumentError> {
        let id = Uuid::now_v7().simple().to_string();

        self.set(collection, &id, document)?;

        Ok(id)
    }

    /// Store a document under `id`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be encoded or saved.
    pub fn set<T: Serialize>(
        &self,
        collection: &'static str,
        id: &str,
        document: &T,
    ) -> Result<(), DocumentError> {
        let value = serde_json::to_value(document).map_err(DocumentError::Encoding)?;

        self.mutate(collection, id, |documents| {
            documents.insert(id.to_string(), value);
        })
    }

    /// Fetch one document.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored document does not match `T`.
    pub fn get<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<T>, DocumentError> {
        let value = read(&self.inner.collections)
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned();

        value
            .map(|value| {
                serde_json::from_value(value).map_err(|source| DocumentError::Malformed {
                    collection,
                    id: id.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Delete one document, reporting whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be saved.
    pub fn delete(&self, collection: &'static str, id: &str) -> Result<bool, DocumentError> {
        self.mutate(collection, id, |documents| documents.remove(id).is_some())
    }

    /// Every document in `collection` that decodes as `T` and satisfies
    /// `predicate`, in id order. Documents that do not decode are skipped.
    ///
    /// # Errors
    ///
    /// Kept fallible to match a remote query; the local backend never fails here.
    pub fn find<T, F>(
        &self,
        collection: &'static str,
        predicate: F,
    ) -> Result<Vec<(String, T)>, DocumentError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let snapshot = read(&self.inner.collections)
            .get(collection)
            .cloned()
            .unwrap_or_default();

        let mut found = Vec::new();

        for (id, value) in snapshot {
            match serde_json::from_value::<T>(value) {
                Ok(document) if predicate(&document) => found.push((id, document)),
                Ok(_) => {}
                Err(error) => warn!(collection, id = %id, %error, "skipping malformed document"),
            }
        }

        Ok(found)
    }

    /// Subscribe to document writes made through any clone of this handle.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.inner.changes.subscribe()
    }

    fn mutate<R>(
        &self,
        collection: &'static str,
        id: &str,
        change: impl FnOnce(&mut BTreeMap<String, Value>) -> R,
    ) -> Result<R, DocumentError> {
        let mut collections = write(&self.inner.collections);

        let mut staged = collections.clone();
        let result = change(staged.entry(collection.to_string()).or_default());

        self.save(&staged)?;
        *collections = staged;

        drop(collections);

        debug!(collection, id, "document written");

        _ = self.inner.changes.send(DocumentChange {
            collection: collection.to_string(),
            id: id.to_string(),
        });

        Ok(result)
    }

    fn save(&self, collections: &Collections) -> Result<(), DocumentError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        let raw = serde_json::to_string_pretty(collections).map_err(DocumentError::Encoding)?;

        replace_file(path, &raw)?;

        Ok(())
    }
}
