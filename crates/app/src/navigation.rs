//! Page routing

use mockall::automock;

use crate::domain::orders::models::OrderId;

/// Pages the client can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Menu,
    Login,
    Signup,
    Cart,
    Checkout,
    Profile,

    /// Order timers. `handoff` names an order that was placed just now.
    Timers { handoff: Option<OrderId> },
}

impl Route {
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Menu => "/menu",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Cart => "/cart",
            Self::Checkout => "/checkout",
            Self::Profile => "/user",
            Self::Timers { .. } => "/delivery-timer",
        }
    }
}

/// Programmatic navigation.
#[automock]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
