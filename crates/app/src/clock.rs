//! Wall Clock

use std::fmt::Debug;
#[cfg(test)]
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use jiff::Timestamp;

/// Source of "now" for everything that compares against deadlines.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> Timestamp;

    /// Current time as epoch milliseconds.
    fn now_millis(&self) -> i64 {
        self.now().as_millisecond()
    }
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. Clones share the same reading.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    millis: Arc<AtomicI64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(at: Timestamp) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(at.as_millisecond())),
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millisecond(self.now_millis()).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn manual_clock_clones_share_time() -> TestResult {
        let clock = ManualClock::new("2026-03-01T12:00:00Z".parse()?);
        let other = clock.clone();

        clock.advance_millis(1_500);

        assert_eq!(other.now(), "2026-03-01T12:00:01.5Z".parse::<Timestamp>()?);

        Ok(())
    }
}
