//! Timer Config

use std::time::Duration;

use clap::Args;

/// Countdown refresh settings.
#[derive(Debug, Clone, Args)]
pub struct TimerConfig {
    /// Milliseconds between countdown updates and timer badge polls
    #[arg(long, env = "HITEA_TICK_MS", default_value_t = 1000, global = true)]
    pub tick_ms: u64,
}

impl TimerConfig {
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
