//! Storage errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage I/O error")]
    Io(#[from] io::Error),

    #[error("failed to encode local storage value")]
    Encoding(#[source] serde_json::Error),
}
