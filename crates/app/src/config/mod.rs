//! Client configuration groups, flattened into the `hitea` command line.

mod observability;
mod storage;
mod timers;

pub use observability::{LogFormat, LoggingConfig};
pub use storage::StorageConfig;
pub use timers::TimerConfig;
