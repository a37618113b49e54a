//! Menu service errors.

use thiserror::Error;

use crate::documents::DocumentError;

#[derive(Debug, Error)]
pub enum MenuServiceError {
    #[error("menu item not found")]
    NotFound,

    #[error("invalid menu item: {0}")]
    InvalidData(&'static str),

    #[error("menu storage error")]
    Backend(#[from] DocumentError),
}
