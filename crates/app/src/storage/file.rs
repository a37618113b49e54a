//! File-backed key-value store.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    process,
    sync::Mutex,
};

use tokio::sync::broadcast;
use tracing::warn;

use crate::{
    storage::{EVENT_CAPACITY, KeyValueStore, StorageError, StorageEvent},
    sync::lock,
};

/// Key-value store persisted as a single JSON object file.
///
/// Every operation re-reads the file, so several processes pointed at the same
/// file see each other's writes. The last writer wins; there is no locking
/// across processes. Change notifications only reach subscribers of this
/// instance.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
    events: broadcast::Sender<StorageEvent>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            path,
            guard: Mutex::new(()),
            events,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(error) => return Err(StorageError::Io(error)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "local storage file is unreadable, starting empty");

                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries).map_err(StorageError::Encoding)?;

        replace_file(&self.path, &raw)?;

        Ok(())
    }

    /// Apply `change` under the instance lock and save when it reports a modification.
    fn update<F>(&self, change: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = lock(&self.guard);

        let mut entries = self.load()?;

        let changed = change(&mut entries);

        if changed {
            self.save(&entries)?;
        }

        Ok(changed)
    }

    fn notify(&self, event: StorageEvent) {
        _ = self.events.send(event);
    }
}

/// Write `contents` beside `path` and rename it into place. The staging file
/// is removed again when either step fails.
pub(crate) fn replace_file(path: &Path, contents: &str) -> io::Result<()> {
    let mut staging = path.to_path_buf().into_os_string();
    staging.push(format!(".{}.tmp", process::id()));
    let staging = PathBuf::from(staging);

    let written = fs::write(&staging, contents).and_then(|()| fs::rename(&staging, path));

    if written.is_err() {
        _ = fs::remove_file(&staging);
    }

    written
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = lock(&self.guard);

        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })?;

        self.notify(StorageEvent::key(key));

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.update(|entries| entries.remove(key).is_some())? {
            self.notify(StorageEvent::key(key));
        }

        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let _guard = lock(&self.guard);

        Ok(self.load()?.into_keys().collect())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.clear();
            true
        })?;

        self.notify(StorageEvent::cleared());

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
