//! Timer page.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    domain::{
        orders::models::OrderId,
        timers::{
            errors::TimerError,
            models::TimerCard,
            registry::{Dismissal, TimerRegistry},
            store::TimerStore,
        },
    },
    navigation::{Navigator, Route},
    sync::lock,
};

/// Default interval between countdown updates.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

pub enum MountOutcome {
    Mounted(TimerView),

    /// Nothing to show; the user was sent to the menu.
    Redirected,
}

/// A mounted timer page: one shared tick task driving every countdown.
///
/// Dropping the view stops the task and releases expired records, the same
/// as [`TimerView::unmount`].
pub struct TimerView {
    registry: Arc<Mutex<TimerRegistry>>,
    cards: Arc<watch::Sender<Vec<TimerCard>>>,
    navigator: Arc<dyn Navigator>,
    ticker: Option<JoinHandle<()>>,
}

impl TimerView {
    /// Load persisted timers and start ticking.
    ///
    /// With no timers and no freshly placed order, navigates to the menu
    /// once and returns [`MountOutcome::Redirected`].
    ///
    /// # Errors
    ///
    /// Returns an error when the timers cannot be read or no tokio runtime
    /// is running.
    pub fn mount(
        store: TimerStore,
        navigator: Arc<dyn Navigator>,
        handoff: Option<OrderId>,
        period: Duration,
    ) -> Result<MountOutcome, TimerError> {
        let registry = TimerRegistry::bootstrap(store)?;

        if registry.is_empty() && handoff.is_none() {
            debug!("no order timers, redirecting to menu");

            navigator.navigate(Route::Menu);

            return Ok(MountOutcome::Redirected);
        }

        if let Some(order_id) = &handoff
            && !registry.contains(order_id)
        {
            warn!(order = %order_id, "hand-off order has no timer record");
        }

        let runtime = Handle::try_current().map_err(TimerError::NoRuntime)?;

        let cards = Arc::new(watch::channel(registry.cards()).0);
        let registry = Arc::new(Mutex::new(registry));

        let ticker = runtime.spawn(run_ticker(
            Arc::clone(&registry),
            Arc::clone(&cards),
            period,
        ));

        info!(timers = lock(&registry).len(), "timer view mounted");

        Ok(MountOutcome::Mounted(Self {
            registry,
            cards,
            navigator,
            ticker: Some(ticker),
        }))
    }

    #[must_use]
    pub fn cards(&self) -> Vec<TimerCard> {
        self.cards.borrow().clone()
    }

    /// Card snapshots, republished on every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<TimerCard>> {
        self.cards.subscribe()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.registry).is_empty()
    }

    /// Dismiss one timer. Dismissing a finished timer returns to the menu.
    ///
    /// # Errors
    ///
    /// Returns an error when the persisted record cannot be removed.
    pub fn dismiss(&self, order_id: &OrderId) -> Result<Option<Dismissal>, TimerError> {
        let (dismissal, cards) = {
            let mut registry = lock(&self.registry);
            let dismissal = registry.dismiss(order_id)?;

            (dismissal, registry.cards())
        };

        self.cards.send_replace(cards);

        if dismissal == Some(Dismissal::Expired) {
            self.navigator.navigate(Route::Menu);
        }

        Ok(dismissal)
    }

    /// Whether the tick task is still running.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|ticker| !ticker.is_finished())
    }

    /// Leave the page.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let Some(ticker) = self.ticker.take() else {
            return;
        };

        ticker.abort();

        lock(&self.registry).release_expired();

        debug!("timer view unmounted");
    }
}

impl Drop for TimerView {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_ticker(
    registry: Arc<Mutex<TimerRegistry>>,
    cards: Arc<watch::Sender<Vec<TimerCard>>>,
    period: Duration,
) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately; mount already published the
    // initial countdowns.
    interval.tick().await;

    loop {
        interval.tick().await;

        let snapshot = {
            let mut registry = lock(&registry);
            registry.tick();
            registry.cards()
        };

        cards.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use testresult::TestResult;
    use tokio::time::timeout;

    use crate::{
        domain::timers::models::TimerStatus,
        navigation::MockNavigator,
        test::{RecordingNavigator, TestContext},
    };

    use super::*;

    fn mounted(outcome: MountOutcome) -> TimerView {
        match outcome {
            MountOutcome::Mounted(view) => view,
            MountOutcome::Redirected => panic!("expected the timer view to mount"),
        }
    }

    #[tokio::test]
    async fn no_timers_redirects_to_menu_exactly_once() -> TestResult {
        let ctx = TestContext::new();

        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::Menu))
            .times(1)
            .return_const(());

        let outcome = TimerView::mount(
            ctx.app.timers.clone(),
            Arc::new(navigator),
            None,
            DEFAULT_TICK,
        )?;

        assert!(matches!(outcome, MountOutcome::Redirected));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_handoff_still_mounts() -> TestResult {
        let ctx = TestContext::new();
        let navigator = RecordingNavigator::new();

        let view = mounted(TimerView::mount(
            ctx.app.timers.clone(),
            navigator.clone(),
            Some(OrderId::from_string("late")),
            DEFAULT_TICK,
        )?);

        assert!(view.cards().is_empty());
        assert!(navigator.routes().is_empty());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn shared_tick_updates_every_card() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.timers.seed(&OrderId::from_string("a"), 1, false)?;
        ctx.app.timers.seed(&OrderId::from_string("b"), 2, true)?;

        let view = mounted(TimerView::mount(
            ctx.app.timers.clone(),
            RecordingNavigator::new(),
            None,
            DEFAULT_TICK,
        )?);

        let mut cards = view.subscribe();

        ctx.clock.advance_millis(90_000);

        timeout(Duration::from_secs(5), cards.changed()).await??;

        let statuses: Vec<TimerStatus> = cards.borrow().iter().map(TimerCard::status).collect();

        assert_eq!(statuses, vec![TimerStatus::Expired, TimerStatus::Running]);
        assert_eq!(
            cards.borrow().last().map(|card| card.countdown.time_left),
            Some(30)
        );

        // The expired record went away on that tick; the running one stays.
        assert_eq!(ctx.app.timers.scan()?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn dismissing_expired_timer_returns_to_menu() -> TestResult {
        let ctx = TestContext::new();
        let order = OrderId::from_string("a");

        ctx.app.timers.seed(&order, 1, false)?;
        ctx.clock.advance_millis(60_000);

        let navigator = RecordingNavigator::new();

        let view = mounted(TimerView::mount(
            ctx.app.timers.clone(),
            navigator.clone(),
            None,
            DEFAULT_TICK,
        )?);

        assert_eq!(view.dismiss(&order)?, Some(Dismissal::Expired));
        assert_eq!(navigator.routes(), vec![Route::Menu]);
        assert!(view.cards().is_empty());
        assert!(!ctx.app.timers.has_active()?);

        Ok(())
    }

    #[tokio::test]
    async fn dismissing_running_timer_stays_on_page() -> TestResult {
        let ctx = TestContext::new();
        let order = OrderId::from_string("a");

        ctx.app.timers.seed(&order, 5, false)?;

        let navigator = RecordingNavigator::new();

        let view = mounted(TimerView::mount(
            ctx.app.timers.clone(),
            navigator.clone(),
            None,
            DEFAULT_TICK,
        )?);

        assert_eq!(view.dismiss(&order)?, Some(Dismissal::Running));
        assert!(navigator.routes().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn unmount_stops_ticking_and_releases_expired_records() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.timers.seed(&OrderId::from_string("a"), 1, false)?;

        let view = mounted(TimerView::mount(
            ctx.app.timers.clone(),
            RecordingNavigator::new(),
            None,
            DEFAULT_TICK,
        )?);

        assert!(view.is_ticking());

        let mut cards = view.subscribe();

        ctx.clock.advance_millis(60_000);
        view.unmount();

        // Every sender is gone once the aborted task has been dropped.
        assert!(timeout(Duration::from_secs(5), cards.changed()).await?.is_err());
        assert!(!ctx.app.timers.has_active()?);

        Ok(())
    }
}
