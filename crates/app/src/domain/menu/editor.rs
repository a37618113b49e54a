//! Admin menu editing.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::{
    auth::SessionProvider,
    domain::menu::{
        errors::MenuServiceError,
        models::{MenuItem, MenuItemId, MenuItemUpdate, NewMenuItem},
        service::MenuService,
    },
};

#[derive(Debug, Error)]
pub enum MenuEditorError {
    #[error("only admins can edit the menu")]
    NotAdmin,

    #[error(transparent)]
    Menu(#[from] MenuServiceError),
}

/// Menu mutations gated on the signed-in user's admin flag.
pub struct MenuEditor {
    menu: Arc<dyn MenuService>,
    session: Arc<dyn SessionProvider>,
}

impl MenuEditor {
    #[must_use]
    pub fn new(menu: Arc<dyn MenuService>, session: Arc<dyn SessionProvider>) -> Self {
        Self { menu, session }
    }

    fn require_admin(&self) -> Result<(), MenuEditorError> {
        if self.session.is_admin() {
            return Ok(());
        }

        warn!(
            user = ?self.session.current_user().map(|user| user.email),
            "menu edit refused for non-admin"
        );

        Err(MenuEditorError::NotAdmin)
    }

    /// # Errors
    ///
    /// Returns [`MenuEditorError::NotAdmin`] unless the session is an admin.
    pub async fn add_item(&self, item: NewMenuItem) -> Result<MenuItem, MenuEditorError> {
        self.require_admin()?;

        Ok(self.menu.create_item(item).await?)
    }

    /// # Errors
    ///
    /// Returns [`MenuEditorError::NotAdmin`] unless the session is an admin.
    pub async fn update_item(
        &self,
        item: MenuItemId,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, MenuEditorError> {
        self.require_admin()?;

        Ok(self.menu.update_item(item, update).await?)
    }

    /// # Errors
    ///
    /// Returns [`MenuEditorError::NotAdmin`] unless the session is an admin.
    pub async fn delete_item(&self, item: MenuItemId) -> Result<(), MenuEditorError> {
        self.require_admin()?;

        Ok(self.menu.delete_item(item).await?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{auth::MockSessionProvider, domain::menu::service::MockMenuService};

    use super::*;

    fn session(is_admin: bool) -> Arc<MockSessionProvider> {
        let mut session = MockSessionProvider::new();

        session.expect_is_admin().return_const(is_admin);
        session.expect_current_user().return_const(None);

        Arc::new(session)
    }

    #[tokio::test]
    async fn non_admin_cannot_delete() {
        // No expectations: any call into the menu service fails the test.
        let menu = Arc::new(MockMenuService::new());

        let editor = MenuEditor::new(menu, session(false));

        let result = editor.delete_item(MenuItemId::from_string("taro")).await;

        assert!(matches!(result, Err(MenuEditorError::NotAdmin)));
    }

    #[tokio::test]
    async fn admin_delete_reaches_menu_service() -> TestResult {
        let mut menu = MockMenuService::new();

        menu.expect_delete_item()
            .withf(|item| item.as_str() == "taro")
            .times(1)
            .returning(|_| Ok(()));

        let editor = MenuEditor::new(Arc::new(menu), session(true));

        editor.delete_item(MenuItemId::from_string("taro")).await?;

        Ok(())
    }
}
