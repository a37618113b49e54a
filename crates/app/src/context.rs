//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tracing::debug;

use crate::{
    auth::{IdentityProvider, LocalIdentityProvider, SessionService},
    clock::{Clock, SystemClock},
    config::StorageConfig,
    documents::{DocumentError, Documents},
    domain::{
        cart::{CartService, LocalCartService},
        menu::{DocMenuService, MenuEditor, MenuOrdering, MenuService},
        orders::{CheckoutFlow, DocOrdersService, OrdersService, models::OrderId},
        ratings::{DocRatingsService, RatingsService},
        timers::{MountOutcome, TimerError, TimerIndicator, TimerStore, TimerView},
        users::{DocUsersService, UsersService},
    },
    navigation::Navigator,
    storage::{FileStore, KeyValueStore, StorageError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to open local storage")]
    Storage(#[source] StorageError),

    #[error("failed to open the document backend")]
    Documents(#[source] DocumentError),
}

/// Every service the client screens share.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub cart: Arc<dyn CartService>,
    pub menu: Arc<dyn MenuService>,
    pub orders: Arc<dyn OrdersService>,
    pub ratings: Arc<dyn RatingsService>,
    pub users: Arc<dyn UsersService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub session: Arc<SessionService>,
    pub timers: TimerStore,
}

impl AppContext {
    /// Open the data directory and restore the signed-in session.
    ///
    /// # Errors
    ///
    /// Returns an error when either backing file cannot be opened.
    pub async fn open(config: &StorageConfig) -> Result<Self, AppInitError> {
        let storage =
            FileStore::open(config.local_storage_path()).map_err(AppInitError::Storage)?;
        let documents =
            Documents::open(config.documents_path()).map_err(AppInitError::Documents)?;

        debug!(data_dir = %config.data_dir.display(), "data directory opened");

        let context = Self::from_parts(Arc::new(storage), documents, Arc::new(SystemClock));

        context.session.refresh().await;

        Ok(context)
    }

    /// Wire every service over the given backends.
    #[must_use]
    pub fn from_parts(
        storage: Arc<dyn KeyValueStore>,
        documents: Documents,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let users: Arc<dyn UsersService> =
            Arc::new(DocUsersService::new(documents.clone(), Arc::clone(&clock)));
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(
            documents.clone(),
            Arc::clone(&storage),
        ));

        Self {
            cart: Arc::new(LocalCartService::load(Arc::clone(&storage))),
            menu: Arc::new(DocMenuService::new(documents.clone())),
            orders: Arc::new(DocOrdersService::new(documents.clone())),
            ratings: Arc::new(DocRatingsService::new(documents, Arc::clone(&clock))),
            session: Arc::new(SessionService::new(
                Arc::clone(&identity),
                Arc::clone(&users),
            )),
            timers: TimerStore::new(Arc::clone(&storage), Arc::clone(&clock)),
            users,
            identity,
            storage,
            clock,
        }
    }

    #[must_use]
    pub fn checkout(&self, navigator: Arc<dyn Navigator>) -> CheckoutFlow {
        CheckoutFlow::new(
            self.session.clone(),
            Arc::clone(&self.cart),
            Arc::clone(&self.menu),
            Arc::clone(&self.orders),
            self.timers.clone(),
            navigator,
        )
    }

    #[must_use]
    pub fn menu_editor(&self) -> MenuEditor {
        MenuEditor::new(Arc::clone(&self.menu), self.session.clone())
    }

    #[must_use]
    pub fn menu_ordering(&self, navigator: Arc<dyn Navigator>) -> MenuOrdering {
        MenuOrdering::new(self.session.clone(), Arc::clone(&self.cart), navigator)
    }

    /// Open the timer page.
    ///
    /// # Errors
    ///
    /// See [`TimerView::mount`].
    pub fn timer_view(
        &self,
        navigator: Arc<dyn Navigator>,
        handoff: Option<OrderId>,
        period: Duration,
    ) -> Result<MountOutcome, TimerError> {
        TimerView::mount(self.timers.clone(), navigator, handoff, period)
    }

    /// Start the header timer badge.
    ///
    /// # Errors
    ///
    /// See [`TimerIndicator::spawn`].
    pub fn timer_indicator(&self, poll: Duration) -> Result<TimerIndicator, TimerError> {
        TimerIndicator::spawn(self.timers.clone(), poll)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use testresult::TestResult;

    use crate::{
        auth::{SessionProvider, models::Credentials},
        domain::cart::models::{CartLineItem, Customization},
        domain::menu::models::{MenuItem, MenuItemId},
    };

    use super::*;

    #[tokio::test]
    async fn reopening_restores_cart_and_session() -> TestResult {
        let dir = tempdir()?;
        let config = StorageConfig {
            data_dir: dir.path().join("data"),
        };

        let first = AppContext::open(&config).await?;

        let user = first
            .session
            .sign_up(Credentials::new("ann@example.com", "secret1"))
            .await?;

        first.cart.add_to_cart(CartLineItem::from_menu_item(
            &MenuItem {
                id: MenuItemId::from_string("taro"),
                product_name: "Taro Milk Tea".to_string(),
                price: 1290,
                description: String::new(),
                preparation_time: 4,
                image: String::new(),
            },
            Customization::default(),
        ));

        drop(first);

        let second = AppContext::open(&config).await?;

        assert_eq!(second.session.current_user(), Some(user.clone()));
        assert_eq!(second.cart.items().len(), 1);
        assert!(second.users.get_profile(user.uid).await.is_ok());

        Ok(())
    }
}
