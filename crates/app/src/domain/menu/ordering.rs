//! Ordering from the menu page.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::{
    auth::SessionProvider,
    domain::{
        cart::{
            CartService,
            models::{CartLineItem, Customization},
        },
        menu::models::MenuItem,
    },
    navigation::{Navigator, Route},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderItemError {
    #[error("sign in to add items to the cart")]
    SignInRequired,
}

/// The menu page's "Order" action.
pub struct MenuOrdering {
    session: Arc<dyn SessionProvider>,
    cart: Arc<dyn CartService>,
    navigator: Arc<dyn Navigator>,
}

impl MenuOrdering {
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionProvider>,
        cart: Arc<dyn CartService>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            cart,
            navigator,
        }
    }

    /// Add a customized menu item to the cart.
    ///
    /// # Errors
    ///
    /// Signed-out users are sent to the login page and get
    /// [`OrderItemError::SignInRequired`]; the cart is left alone.
    pub fn order(
        &self,
        item: &MenuItem,
        customization: Customization,
    ) -> Result<CartLineItem, OrderItemError> {
        if self.session.current_user().is_none() {
            self.navigator.navigate(Route::Login);

            return Err(OrderItemError::SignInRequired);
        }

        let line = CartLineItem::from_menu_item(item, customization);

        debug!(item = %line.id, quantity = line.quantity.get(), "ordering from menu");

        self.cart.add_to_cart(line.clone());

        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use testresult::TestResult;

    use crate::{
        auth::{
            MockSessionProvider,
            models::{User, UserId},
        },
        domain::{cart::MockCartService, menu::models::MenuItemId},
        navigation::MockNavigator,
    };

    use super::*;

    fn taro() -> MenuItem {
        MenuItem {
            id: MenuItemId::from_string("taro"),
            product_name: "Taro Milk Tea".to_string(),
            price: 1290,
            description: String::new(),
            preparation_time: 4,
            image: String::new(),
        }
    }

    #[test]
    fn signed_out_user_is_sent_to_login() {
        let mut session = MockSessionProvider::new();
        session.expect_current_user().return_const(None);

        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(Route::Login))
            .times(1)
            .return_const(());

        let ordering = MenuOrdering::new(
            Arc::new(session),
            Arc::new(MockCartService::new()),
            Arc::new(navigator),
        );

        let result = ordering.order(&taro(), Customization::default());

        assert_eq!(result, Err(OrderItemError::SignInRequired));
    }

    #[test]
    fn signed_in_user_adds_customized_line() -> TestResult {
        let mut session = MockSessionProvider::new();
        session
            .expect_current_user()
            .return_const(Some(User {
                uid: UserId::from_string("ann"),
                email: "ann@example.com".to_string(),
                display_name: Some("Ann".to_string()),
            }));

        let mut cart = MockCartService::new();
        cart.expect_add_to_cart()
            .withf(|line| line.name == "Taro Milk Tea" && line.price == 1290)
            .times(1)
            .return_const(());

        let ordering = MenuOrdering::new(
            Arc::new(session),
            Arc::new(cart),
            Arc::new(MockNavigator::new()),
        );

        let line = ordering.order(&taro(), Customization::default())?;

        assert_eq!(line.quantity.get(), 1);

        Ok(())
    }
}
