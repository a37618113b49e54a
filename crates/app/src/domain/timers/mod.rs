//! Order Timers
//!
//! Every placed order gets a countdown persisted under `timer_<order id>` in
//! the key-value mirror. The timer page ([`TimerView`]) ticks all of them
//! from one task; the header badge ([`TimerIndicator`]) only cares whether
//! any exist.

pub mod errors;
pub mod indicator;
pub mod models;
pub mod registry;
pub mod store;
pub mod view;

pub use errors::TimerError;
pub use indicator::TimerIndicator;
pub use registry::{Dismissal, TimerRegistry};
pub use store::TimerStore;
pub use view::{MountOutcome, TimerView};
