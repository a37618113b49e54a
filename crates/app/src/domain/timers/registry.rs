//! In-memory registry of running timers.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::domain::{
    orders::models::OrderId,
    timers::{
        errors::TimerError,
        models::{Countdown, OrderTimer, TimerCard},
        store::TimerStore,
    },
};

#[derive(Debug, Clone)]
struct Entry {
    timer: OrderTimer,
    countdown: Countdown,

    /// Set by the first tick that sees the deadline pass.
    expired: bool,

    /// Set once the persisted record has been removed.
    released: bool,
}

impl Entry {
    fn card(&self) -> TimerCard {
        TimerCard {
            order_id: self.timer.order_id.clone(),
            is_delivery: self.timer.is_delivery,
            countdown: self.countdown,
        }
    }
}

/// What a dismissed timer was showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    Running,
    Expired,
}

/// Every known timer, ticked together from a single clock reading.
pub struct TimerRegistry {
    store: TimerStore,
    entries: BTreeMap<OrderId, Entry>,
}

impl TimerRegistry {
    /// Load every persisted timer and compute its initial countdown.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be scanned.
    pub fn bootstrap(store: TimerStore) -> Result<Self, TimerError> {
        let now = store.now();

        let entries = store
            .scan()?
            .into_iter()
            .map(|timer| {
                let entry = Entry {
                    countdown: timer.countdown(now),
                    timer,
                    expired: false,
                    released: false,
                };

                (entry.timer.order_id.clone(), entry)
            })
            .collect();

        Ok(Self { store, entries })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.entries.contains_key(order_id)
    }

    /// Current cards, in order id order.
    #[must_use]
    pub fn cards(&self) -> Vec<TimerCard> {
        self.entries.values().map(Entry::card).collect()
    }

    /// Recompute every countdown and return the orders that expired on this tick.
    ///
    /// The persisted record of an expired timer is removed on the first tick
    /// that sees it expire. When that removal fails the record is left for
    /// [`Self::dismiss`] or [`Self::release_expired`].
    pub fn tick(&mut self) -> Vec<OrderId> {
        let now = self.store.now();

        let mut expired = Vec::new();

        for entry in self.entries.values_mut() {
            entry.countdown = entry.timer.countdown(now);

            if !entry.countdown.time_up() || entry.expired {
                continue;
            }

            entry.expired = true;

            let order_id = &entry.timer.order_id;

            info!(order = %order_id, "order timer expired");

            match self.store.remove(order_id) {
                Ok(()) => entry.released = true,
                Err(error) => warn!(order = %order_id, %error, "failed to remove expired timer"),
            }

            expired.push(order_id.clone());
        }

        expired
    }

    /// Forget a timer and its persisted record.
    ///
    /// Returns `None` when the registry had no such timer.
    ///
    /// # Errors
    ///
    /// Returns an error when the persisted record cannot be removed; the
    /// in-memory entry is kept in that case.
    pub fn dismiss(&mut self, order_id: &OrderId) -> Result<Option<Dismissal>, TimerError> {
        let Some(entry) = self.entries.get(order_id) else {
            return Ok(None);
        };

        if !entry.released {
            self.store.remove(order_id)?;
        }

        let dismissal = if entry.countdown.time_up() {
            Dismissal::Expired
        } else {
            Dismissal::Running
        };

        self.entries.remove(order_id);

        info!(order = %order_id, ?dismissal, "order timer dismissed");

        Ok(Some(dismissal))
    }

    /// Remove the persisted records of every timer that is past its deadline.
    pub fn release_expired(&mut self) {
        let now = self.store.now();

        for entry in self.entries.values_mut() {
            if entry.released || !entry.timer.countdown(now).time_up() {
                continue;
            }

            match self.store.remove(&entry.timer.order_id) {
                Ok(()) => entry.released = true,
                Err(error) => {
                    warn!(order = %entry.timer.order_id, %error, "failed to release expired timer");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use jiff::Timestamp;
    use mockall::{Sequence, predicate::eq};
    use testresult::TestResult;

    use crate::{
        clock::{Clock, ManualClock},
        domain::timers::models::TimerStatus,
        storage::{MockKeyValueStore, StorageError},
        test::TestContext,
    };

    use super::*;

    /// A store holding `timer_a`, due five seconds after `clock`'s reading,
    /// whose first removal fails and second succeeds.
    fn store_with_flaky_remove(clock: &ManualClock) -> TimerStore {
        let deadline = clock.now_millis() + 5_000;

        let mut storage = MockKeyValueStore::new();
        let mut removals = Sequence::new();

        storage
            .expect_keys()
            .returning(|| Ok(vec!["timer_a".to_string()]));
        storage.expect_get().with(eq("timer_a")).returning(move |_| {
            Ok(Some(format!(
                r#"{{"endTime": {deadline}, "isDelivery": false}}"#
            )))
        });
        storage
            .expect_remove()
            .with(eq("timer_a"))
            .times(1)
            .in_sequence(&mut removals)
            .returning(|_| Err(StorageError::Io(io::Error::other("disk full"))));
        storage
            .expect_remove()
            .with(eq("timer_a"))
            .times(1)
            .in_sequence(&mut removals)
            .returning(|_| Ok(()));

        TimerStore::new(Arc::new(storage), Arc::new(clock.clone()))
    }

    #[test]
    fn bootstrap_computes_initial_countdowns() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.timers.seed(&OrderId::from_string("a"), 5, false)?;
        ctx.app.timers.seed(&OrderId::from_string("b"), 1, true)?;
        ctx.clock.advance_millis(30_000);

        let registry = TimerRegistry::bootstrap(ctx.app.timers.clone())?;

        let left: Vec<u64> = registry
            .cards()
            .iter()
            .map(|card| card.countdown.time_left)
            .collect();

        assert_eq!(left, vec![270, 30]);

        Ok(())
    }

    #[test]
    fn bootstrap_sees_running_and_expired_timers_without_removing_either() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.timers.seed(&OrderId::from_string("a"), 2, false)?;
        ctx.app.timers.seed(&OrderId::from_string("b"), 1, false)?;
        ctx.clock.advance_millis(60_000);

        let registry = TimerRegistry::bootstrap(ctx.app.timers.clone())?;
        let cards = registry.cards();

        assert_eq!(cards.len(), 2);

        let a = cards.first().ok_or("missing card a")?;
        let b = cards.get(1).ok_or("missing card b")?;

        assert_eq!(a.order_id, OrderId::from_string("a"));
        assert_eq!(a.status(), TimerStatus::Running);
        assert!(!a.countdown.time_up());
        assert_eq!(a.countdown.time_left, 60);

        assert_eq!(b.order_id, OrderId::from_string("b"));
        assert!(b.countdown.time_up());

        assert_eq!(ctx.app.timers.scan()?.len(), 2);

        Ok(())
    }

    #[test]
    fn tick_advances_every_entry_from_one_reading() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.timers.seed(&OrderId::from_string("a"), 5, false)?;
        ctx.app.timers.seed(&OrderId::from_string("b"), 10, false)?;

        let mut registry = TimerRegistry::bootstrap(ctx.app.timers.clone())?;

        ctx.clock.advance_millis(61_000);

        assert!(registry.tick().is_empty());

        let left: Vec<u64> = registry
            .cards()
            .iter()
            .map(|card| card.countdown.time_left)
            .collect();

        assert_eq!(left, vec![239, 539]);

        Ok(())
    }

    #[test]
    fn expiry_removes_record_exactly_once() -> TestResult {
        let clock = ManualClock::new("2026-03-01T12:00:00Z".parse::<Timestamp>()?);
        let deadline = clock.now_millis() + 5_000;

        let mut storage = MockKeyValueStore::new();

        storage
            .expect_keys()
            .returning(|| Ok(vec!["timer_a".to_string()]));
        storage.expect_get().with(eq("timer_a")).returning(move |_| {
            Ok(Some(format!(
                r#"{{"endTime": {deadline}, "isDelivery": false}}"#
            )))
        });
        storage
            .expect_remove()
            .with(eq("timer_a"))
            .times(1)
            .returning(|_| Ok(()));

        let store = TimerStore::new(Arc::new(storage), Arc::new(clock.clone()));
        let mut registry = TimerRegistry::bootstrap(store)?;

        clock.advance_millis(4_000);
        assert!(registry.tick().is_empty());

        clock.advance_millis(1_000);
        assert_eq!(registry.tick(), vec![OrderId::from_string("a")]);

        clock.advance_millis(1_000);
        assert!(registry.tick().is_empty());
        registry.release_expired();

        assert_eq!(
            registry.dismiss(&OrderId::from_string("a"))?,
            Some(Dismissal::Expired)
        );

        Ok(())
    }

    #[test]
    fn failed_expiry_removal_is_retried_on_release() -> TestResult {
        let clock = ManualClock::new("2026-03-01T12:00:00Z".parse::<Timestamp>()?);
        let mut registry = TimerRegistry::bootstrap(store_with_flaky_remove(&clock))?;

        clock.advance_millis(5_000);
        assert_eq!(registry.tick(), vec![OrderId::from_string("a")]);

        clock.advance_millis(1_000);
        assert!(registry.tick().is_empty());

        registry.release_expired();

        assert_eq!(
            registry.dismiss(&OrderId::from_string("a"))?,
            Some(Dismissal::Expired)
        );

        Ok(())
    }

    #[test]
    fn failed_expiry_removal_is_retried_on_dismiss() -> TestResult {
        let clock = ManualClock::new("2026-03-01T12:00:00Z".parse::<Timestamp>()?);
        let mut registry = TimerRegistry::bootstrap(store_with_flaky_remove(&clock))?;

        clock.advance_millis(5_000);
        assert_eq!(registry.tick(), vec![OrderId::from_string("a")]);

        assert_eq!(
            registry.dismiss(&OrderId::from_string("a"))?,
            Some(Dismissal::Expired)
        );
        assert!(registry.is_empty());

        Ok(())
    }

    #[test]
    fn dismissing_running_timer_removes_record() -> TestResult {
        let ctx = TestContext::new();
        let order = OrderId::from_string("a");

        ctx.app.timers.seed(&order, 5, false)?;

        let mut registry = TimerRegistry::bootstrap(ctx.app.timers.clone())?;

        assert_eq!(registry.dismiss(&order)?, Some(Dismissal::Running));
        assert_eq!(registry.dismiss(&order)?, None);
        assert!(registry.is_empty());
        assert!(!ctx.app.timers.has_active()?);

        Ok(())
    }

    #[test]
    fn release_expired_only_touches_past_deadlines() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.timers.seed(&OrderId::from_string("done"), 1, false)?;
        ctx.app.timers.seed(&OrderId::from_string("pending"), 30, false)?;

        let mut registry = TimerRegistry::bootstrap(ctx.app.timers.clone())?;

        ctx.clock.advance_millis(120_000);
        registry.release_expired();

        let remaining: Vec<String> = ctx
            .app
            .timers
            .scan()?
            .into_iter()
            .map(|timer| timer.order_id.into_string())
            .collect();

        assert_eq!(remaining, vec!["pending"]);
        assert_eq!(registry.len(), 2);

        Ok(())
    }
}
