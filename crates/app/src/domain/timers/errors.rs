//! Order timer errors.

use thiserror::Error;
use tokio::runtime::TryCurrentError;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("timer storage error")]
    Storage(#[from] StorageError),

    #[error("timer deadline out of range")]
    Deadline(#[source] jiff::Error),

    #[error("timers need a running tokio runtime")]
    NoRuntime(#[source] TryCurrentError),
}
