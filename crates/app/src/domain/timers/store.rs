//! Persisted order timers.

use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    clock::Clock,
    domain::{
        orders::models::OrderId,
        timers::{
            errors::TimerError,
            models::{OrderTimer, TIMER_KEY_PREFIX, TimerRecord, order_id_from_key, timer_key},
        },
    },
    storage::{KeyValueStore, KeyValueStoreExt, StorageEvent},
};

/// Timer records in the key-value mirror, read against an injected clock.
#[derive(Clone)]
pub struct TimerStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TimerStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Start the countdown for a freshly placed order.
    ///
    /// # Errors
    ///
    /// Returns an error when the deadline is out of range or the record
    /// cannot be written.
    pub fn seed(
        &self,
        order_id: &OrderId,
        estimated_minutes: u32,
        is_delivery: bool,
    ) -> Result<OrderTimer, TimerError> {
        let end_time = self
            .clock
            .now_millis()
            .saturating_add(i64::from(estimated_minutes).saturating_mul(60_000));

        let timer = to_timer(order_id.clone(), end_time, is_delivery)?;

        self.storage.write_json(
            &timer_key(order_id),
            &TimerRecord {
                end_time,
                is_delivery,
            },
        )?;

        info!(order = %order_id, estimated_minutes, is_delivery, "order timer started");

        Ok(timer)
    }

    /// The timer for one order, if it has a readable record.
    #[must_use]
    pub fn load(&self, order_id: &OrderId) -> Option<OrderTimer> {
        let record = self.storage.read_json::<TimerRecord>(&timer_key(order_id))?;

        to_timer(order_id.clone(), record.end_time, record.is_delivery)
            .inspect_err(|error| warn!(order = %order_id, %error, "ignoring timer record"))
            .ok()
    }

    /// Every readable timer, in key order. Unreadable records are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error when the keys cannot be listed.
    pub fn scan(&self) -> Result<Vec<OrderTimer>, TimerError> {
        Ok(self
            .storage
            .keys()?
            .iter()
            .filter_map(|key| order_id_from_key(key))
            .filter_map(|order_id| self.load(&order_id))
            .collect())
    }

    /// Remove the persisted record for an order. Absent records are fine.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying store fails.
    pub fn remove(&self, order_id: &OrderId) -> Result<(), TimerError> {
        self.storage.remove(&timer_key(order_id))?;

        Ok(())
    }

    /// Whether any timer key exists, readable or not.
    ///
    /// # Errors
    ///
    /// Returns an error when the keys cannot be listed.
    pub fn has_active(&self) -> Result<bool, TimerError> {
        Ok(self
            .storage
            .keys()?
            .iter()
            .any(|key| key.starts_with(TIMER_KEY_PREFIX)))
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.storage.subscribe()
    }
}

fn to_timer(order_id: OrderId, end_time: i64, is_delivery: bool) -> Result<OrderTimer, TimerError> {
    Ok(OrderTimer {
        order_id,
        end_time: Timestamp::from_millisecond(end_time).map_err(TimerError::Deadline)?,
        is_delivery,
    })
}
