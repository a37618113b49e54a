//! Menu

pub mod editor;
pub mod errors;
pub mod models;
pub mod ordering;
mod records;
pub mod service;

pub use editor::{MenuEditor, MenuEditorError};
pub use errors::MenuServiceError;
pub use ordering::{MenuOrdering, OrderItemError};
pub use service::*;
