//! Ratings

pub mod errors;
pub mod models;
pub mod service;

pub use errors::RatingsServiceError;
pub use service::*;
