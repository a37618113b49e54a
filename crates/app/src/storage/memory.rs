//! In-process key-value store.

use std::{collections::BTreeMap, sync::RwLock};

use tokio::sync::broadcast;

use crate::{
    storage::{EVENT_CAPACITY, KeyValueStore, StorageError, StorageEvent},
    sync::{read, write},
};

/// Key-value store that lives only as long as the process.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            entries: RwLock::new(BTreeMap::new()),
            events,
        }
    }

    fn notify(&self, event: StorageEvent) {
        // No subscribers is fine.
        _ = self.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(read(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        write(&self.entries).insert(key.to_string(), value.to_string());

        self.notify(StorageEvent::key(key));

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = write(&self.entries).remove(key).is_some();

        if removed {
            self.notify(StorageEvent::key(key));
        }

        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(read(&self.entries).keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), StorageError> {
        write(&self.entries).clear();

        self.notify(StorageEvent::cleared());

        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn keys_are_listed_in_order() -> TestResult {
        let store = MemoryStore::new();

        store.set("timer_b", "{}")?;
        store.set("cart", "[]")?;
        store.set("timer_a", "{}")?;

        assert_eq!(store.keys()?, vec!["cart", "timer_a", "timer_b"]);

        Ok(())
    }

    #[test]
    fn writes_and_removals_are_announced() -> TestResult {
        let store = MemoryStore::new();
        let mut events = store.subscribe();

        store.set("timer_a", "{}")?;
        store.remove("timer_a")?;
        store.remove("timer_a")?;
        store.clear()?;

        assert_eq!(events.try_recv()?, StorageEvent::key("timer_a"));
        assert_eq!(events.try_recv()?, StorageEvent::key("timer_a"));
        assert_eq!(events.try_recv()?, StorageEvent::cleared());
        assert!(events.try_recv().is_err(), "absent key removal is silent");

        Ok(())
    }
}
