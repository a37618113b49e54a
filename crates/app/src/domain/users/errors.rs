//! Users service errors.

use thiserror::Error;

use crate::documents::DocumentError;

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("profile not found")]
    NotFound,

    #[error("profile already exists")]
    AlreadyExists,

    #[error("user storage error")]
    Backend(#[from] DocumentError),
}
