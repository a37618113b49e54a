//! Header badge showing whether any order timer exists.

use std::{future, time::Duration};

use tokio::{
    runtime::Handle,
    sync::{
        broadcast::{self, error::RecvError},
        watch,
    },
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    domain::timers::{errors::TimerError, models::TIMER_KEY_PREFIX, store::TimerStore},
    storage::StorageEvent,
};

/// Watches the key-value mirror for timer keys.
///
/// Rescans on every poll and on every change notification that could touch a
/// timer. The background task stops when the indicator is dropped.
pub struct TimerIndicator {
    visible: watch::Receiver<bool>,
    watcher: JoinHandle<()>,
}

impl TimerIndicator {
    /// # Errors
    ///
    /// Returns an error when no tokio runtime is running.
    pub fn spawn(store: TimerStore, poll: Duration) -> Result<Self, TimerError> {
        let runtime = Handle::try_current().map_err(TimerError::NoRuntime)?;

        let events = store.subscribe();
        let (sender, visible) = watch::channel(scan(&store));

        let watcher = runtime.spawn(watch_timers(store, Some(events), sender, poll));

        Ok(Self { visible, watcher })
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.clone()
    }
}

impl Drop for TimerIndicator {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

fn scan(store: &TimerStore) -> bool {
    store.has_active().unwrap_or_else(|error| {
        warn!(%error, "failed to scan for order timers");

        false
    })
}

async fn watch_timers(
    store: TimerStore,
    mut events: Option<broadcast::Receiver<StorageEvent>>,
    visible: watch::Sender<bool>,
    poll: Duration,
) {
    let mut interval = time::interval(poll);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        let rescan = tokio::select! {
            _ = interval.tick() => true,
            relevant = next_event(&mut events) => relevant,
        };

        if !rescan {
            continue;
        }

        let active = scan(&store);

        visible.send_if_modified(|shown| {
            let changed = *shown != active;
            *shown = active;
            changed
        });
    }
}

/// Wait for the next notification and report whether it may concern a timer.
async fn next_event(events: &mut Option<broadcast::Receiver<StorageEvent>>) -> bool {
    let received = match events {
        Some(receiver) => receiver.recv().await,
        None => return future::pending().await,
    };

    match received {
        Ok(event) => event
            .key
            .as_deref()
            .is_none_or(|key| key.starts_with(TIMER_KEY_PREFIX)),
        Err(RecvError::Lagged(skipped)) => {
            debug!(skipped, "storage notifications lagged");

            true
        }
        Err(RecvError::Closed) => {
            *events = None;

            false
        }
    }
}
