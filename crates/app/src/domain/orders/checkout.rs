//! Ordering flow
//!
//! Turns the cart into an order document, seeds the order's countdown and
//! hands the user over to the timer page.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    auth::SessionProvider,
    domain::{
        cart::{
            CartService,
            models::{CartLineItem, item_count, subtotal},
        },
        locations::Location,
        menu::MenuService,
        orders::{
            errors::OrdersServiceError,
            models::{FulfillmentMethod, NewOrder, OrderId, OrderLine, PaymentMethod},
            service::OrdersService,
        },
        timers::{TimerStore, models::OrderTimer},
    },
    navigation::{Navigator, Route},
};

/// Extra minutes added to every delivery estimate.
pub const DELIVERY_PADDING_MINUTES: u32 = 15;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to place an order")]
    AuthenticationRequired,

    #[error("the cart is empty")]
    EmptyCart,

    #[error("please select a pickup location")]
    MissingPickupLocation,

    #[error("the order could not be placed, please try again")]
    OrderWrite(#[source] OrdersServiceError),
}

impl CheckoutError {
    /// Whether the same request may succeed if submitted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::OrderWrite(_))
    }
}

/// What the user filled in on the checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub fulfillment: FulfillmentMethod,
    pub pickup_location: Option<Location>,
    pub address: Option<String>,
    pub payment: PaymentMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutQuote {
    pub item_count: u64,
    pub total: u64,
    pub estimated_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: u64,
    pub estimated_minutes: u32,

    /// `None` when the countdown could not be saved; the order still stands.
    pub timer: Option<OrderTimer>,
}

pub struct CheckoutFlow {
    session: Arc<dyn SessionProvider>,
    cart: Arc<dyn CartService>,
    menu: Arc<dyn MenuService>,
    orders: Arc<dyn OrdersService>,
    timers: TimerStore,
    navigator: Arc<dyn Navigator>,
}

impl CheckoutFlow {
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionProvider>,
        cart: Arc<dyn CartService>,
        menu: Arc<dyn MenuService>,
        orders: Arc<dyn OrdersService>,
        timers: TimerStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            cart,
            menu,
            orders,
            timers,
            navigator,
        }
    }

    /// Sum of preparation time over `lines`, padded for delivery.
    ///
    /// Lines whose menu item cannot be read contribute nothing.
    pub async fn estimate_minutes(
        &self,
        lines: &[CartLineItem],
        fulfillment: FulfillmentMethod,
    ) -> u32 {
        let mut minutes: u32 = 0;

        for line in lines {
            match self.menu.get_item(line.id.clone()).await {
                Ok(item) => {
                    minutes = minutes
                        .saturating_add(item.preparation_time.saturating_mul(line.quantity.get()));
                }
                Err(error) => {
                    debug!(item = %line.id, %error, "no preparation time for cart line");
                }
            }
        }

        if fulfillment == FulfillmentMethod::Delivery {
            minutes = minutes.saturating_add(DELIVERY_PADDING_MINUTES);
        }

        minutes
    }

    /// Preview the current cart without writing anything.
    pub async fn quote(&self, fulfillment: FulfillmentMethod) -> CheckoutQuote {
        let lines = self.cart.items();

        CheckoutQuote {
            item_count: item_count(&lines),
            total: subtotal(&lines),
            estimated_minutes: self.estimate_minutes(&lines, fulfillment).await,
        }
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// Validation failures are returned before anything is written. A failed
    /// order write returns [`CheckoutError::OrderWrite`] and leaves the cart
    /// untouched.
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<PlacedOrder, CheckoutError> {
        let Some(user) = self.session.current_user() else {
            self.navigator.navigate(Route::Login);

            return Err(CheckoutError::AuthenticationRequired);
        };

        let lines = self.cart.items();

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let is_delivery = request.fulfillment == FulfillmentMethod::Delivery;

        let pickup_location = match request.fulfillment {
            FulfillmentMethod::Pickup => Some(
                request
                    .pickup_location
                    .ok_or(CheckoutError::MissingPickupLocation)?,
            ),
            FulfillmentMethod::Delivery => None,
        };

        let estimated_minutes = self.estimate_minutes(&lines, request.fulfillment).await;
        let total = subtotal(&lines);

        let order = NewOrder {
            uid: user.uid.clone(),
            email: user.email.clone(),
            name: user
                .display_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            delivery: is_delivery,
            pick_up: !is_delivery,
            pickup_location,
            address: request.address.filter(|_| is_delivery),
            items: lines.iter().map(OrderLine::from).collect(),
            card: request.payment == PaymentMethod::Card,
            cash: request.payment == PaymentMethod::Cash,
            order_date: self.timers.now(),
            total,
        };

        let order_id = self.orders.create_order(order).await.map_err(|error| {
            error!(uid = %user.uid, %error, "failed to write order");

            CheckoutError::OrderWrite(error)
        })?;

        let timer = match self.timers.seed(&order_id, estimated_minutes, is_delivery) {
            Ok(timer) => Some(timer),
            Err(error) => {
                warn!(order = %order_id, %error, "order placed but its timer could not be saved");

                None
            }
        };

        self.cart.clear_cart();

        self.navigator.navigate(Route::Timers {
            handoff: Some(order_id.clone()),
        });

        info!(
            order = %order_id,
            fulfillment = %request.fulfillment,
            payment = %request.payment,
            total,
            estimated_minutes,
            "order placed"
        );

        Ok(PlacedOrder {
            order_id,
            total,
            estimated_minutes,
            timer,
        })
    }
}
