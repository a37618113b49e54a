//! Live order history.

use tokio::{sync::watch, task::JoinHandle};

use crate::domain::orders::models::Order;

/// A live view of one user's order history.
///
/// The backing listener stops on [`OrderSubscription::unsubscribe`] or when
/// the subscription is dropped.
#[derive(Debug)]
pub struct OrderSubscription {
    orders: watch::Receiver<Vec<Order>>,
    listener: JoinHandle<()>,
}

impl OrderSubscription {
    pub(crate) fn new(orders: watch::Receiver<Vec<Order>>, listener: JoinHandle<()>) -> Self {
        Self { orders, listener }
    }

    /// The most recent list, newest first.
    #[must_use]
    pub fn current(&self) -> Vec<Order> {
        self.orders.borrow().clone()
    }

    /// Wait for the next change. `None` once the listener has stopped.
    pub async fn changed(&mut self) -> Option<Vec<Order>> {
        self.orders.changed().await.ok()?;

        Some(self.orders.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for OrderSubscription {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
