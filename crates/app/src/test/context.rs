//! Test context for service-level tests.

use std::sync::Arc;

use jiff::Timestamp;

use crate::{
    auth::{
        SessionError,
        models::{Credentials, User},
    },
    clock::ManualClock,
    context::AppContext,
    documents::Documents,
    domain::menu::{
        MenuService, MenuServiceError,
        models::{MenuItem, NewMenuItem},
    },
    storage::MemoryStore,
};

/// Fixed starting instant for every test clock.
const START: i64 = 1_772_366_400_000;

/// Every service wired over in-memory backends and a manual clock.
pub(crate) struct TestContext {
    pub app: AppContext,
    pub storage: Arc<MemoryStore>,
    pub clock: ManualClock,
}

impl TestContext {
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStore::new());
        let clock =
            ManualClock::new(Timestamp::from_millisecond(START).unwrap_or(Timestamp::UNIX_EPOCH));

        let app = AppContext::from_parts(
            storage.clone(),
            Documents::in_memory(),
            Arc::new(clock.clone()),
        );

        Self {
            app,
            storage,
            clock,
        }
    }

    /// Create an account (and its profile) and leave it signed in.
    pub async fn sign_up(&self, email: &str) -> Result<User, SessionError> {
        self.app
            .session
            .sign_up(Credentials::new(email, "secret1"))
            .await
    }

    pub async fn seed_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, MenuServiceError> {
        self.app.menu.create_item(item).await
    }
}
