//! Orders service errors.

use thiserror::Error;

use crate::documents::DocumentError;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("order storage error")]
    Backend(#[from] DocumentError),
}
