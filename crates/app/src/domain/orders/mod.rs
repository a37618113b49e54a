//! Orders

pub mod checkout;
pub mod errors;
pub mod models;
pub mod service;
pub mod subscription;

pub use checkout::{CheckoutError, CheckoutFlow};
pub use errors::OrdersServiceError;
pub use service::*;
pub use subscription::OrderSubscription;
