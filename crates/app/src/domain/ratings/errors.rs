//! Ratings service errors.

use thiserror::Error;

use crate::documents::DocumentError;

#[derive(Debug, Error)]
pub enum RatingsServiceError {
    #[error("rating must be between 1 and 5 stars, got {0}")]
    InvalidRating(u8),

    #[error("rating storage error")]
    Backend(#[from] DocumentError),
}
