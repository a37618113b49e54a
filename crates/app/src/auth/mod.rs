//! Authentication

mod errors;
mod local;
pub mod models;
mod provider;
mod session;

pub use errors::*;
pub use local::{LocalIdentityProvider, SESSION_KEY};
pub use provider::*;
pub use session::*;
