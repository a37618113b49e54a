//! Ordering client for the HiTea bubble-tea shops: menu, cart, checkout,
//! order countdowns, ratings and accounts over local backends.

pub mod auth;
pub mod clock;
pub mod config;
pub mod context;
pub mod documents;
pub mod domain;
pub mod ids;
pub mod navigation;
pub mod observability;
pub mod storage;

mod sync;

#[cfg(test)]
mod test;
