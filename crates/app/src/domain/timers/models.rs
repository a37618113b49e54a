//! Order Timer Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::orders::models::OrderId;

/// Prefix of every timer key in the key-value mirror.
pub const TIMER_KEY_PREFIX: &str = "timer_";

#[must_use]
pub fn timer_key(order: &OrderId) -> String {
    format!("{TIMER_KEY_PREFIX}{order}")
}

/// The order id a timer key belongs to, if `key` is a timer key.
#[must_use]
pub fn order_id_from_key(key: &str) -> Option<OrderId> {
    key.strip_prefix(TIMER_KEY_PREFIX)
        .filter(|id| !id.is_empty())
        .map(OrderId::from_string)
}

/// Order Timer Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTimer {
    pub order_id: OrderId,

    /// Fixed when the order is placed.
    pub end_time: Timestamp,

    pub is_delivery: bool,
}

impl OrderTimer {
    #[must_use]
    pub fn countdown(&self, now: Timestamp) -> Countdown {
        Countdown::between(self.end_time, now)
    }
}

/// Persisted timer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimerRecord {
    /// Epoch milliseconds.
    pub end_time: i64,
    pub is_delivery: bool,
}

/// Whole seconds left until a deadline, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Countdown {
    pub time_left: u64,
}

impl Countdown {
    #[must_use]
    pub fn between(end_time: Timestamp, now: Timestamp) -> Self {
        let remaining = end_time
            .as_millisecond()
            .saturating_sub(now.as_millisecond());

        Self {
            time_left: u64::try_from(remaining / 1000).unwrap_or(0),
        }
    }

    #[must_use]
    pub const fn time_up(self) -> bool {
        self.time_left == 0
    }
}

impl Display for Countdown {
    /// `MM:SS`; minutes keep counting past 99.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running,
    Expired,
}

/// What the timer page shows for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerCard {
    pub order_id: OrderId,
    pub is_delivery: bool,
    pub countdown: Countdown,
}

impl TimerCard {
    #[must_use]
    pub const fn status(&self) -> TimerStatus {
        if self.countdown.time_up() {
            TimerStatus::Expired
        } else {
            TimerStatus::Running
        }
    }

    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match (self.status(), self.is_delivery) {
            (TimerStatus::Running, true) => "Your order is on its way!",
            (TimerStatus::Running, false) => "Your order is being prepared!",
            (TimerStatus::Expired, true) => "Your order has arrived!",
            (TimerStatus::Expired, false) => "Your order is ready for pickup!",
        }
    }
}

impl Display for TimerCard {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.status() {
            TimerStatus::Running => write!(
                f,
                "{}  {}  (estimated time remaining {})",
                self.order_id,
                self.headline(),
                self.countdown
            ),
            TimerStatus::Expired => write!(f, "{}  {}", self.order_id, self.headline()),
        }
    }
}
