//! HiTea Domain Concerns

pub mod cart;
pub mod locations;
pub mod menu;
pub mod orders;
pub mod ratings;
pub mod timers;
pub mod users;
