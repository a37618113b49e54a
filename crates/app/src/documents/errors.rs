//! Document backend errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document backend I/O error")]
    Io(#[from] io::Error),

    #[error("failed to encode document")]
    Encoding(#[source] serde_json::Error),

    #[error("document file is corrupt")]
    Corrupt(#[source] serde_json::Error),

    #[error("malformed document {collection}/{id}")]
    Malformed {
        collection: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
