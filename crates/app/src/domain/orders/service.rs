//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{debug, info, warn};

use crate::{
    auth::models::UserId,
    documents::{Documents, collections::ORDERS},
    domain::orders::{
        errors::OrdersServiceError,
        models::{NewOrder, Order, OrderId},
        subscription::OrderSubscription,
    },
};

#[derive(Debug, Clone)]
pub struct DocOrdersService {
    docs: Documents,
}

impl DocOrdersService {
    #[must_use]
    pub fn new(docs: Documents) -> Self {
        Self { docs }
    }
}

fn orders_for(docs: &Documents, user: &UserId) -> Result<Vec<Order>, OrdersServiceError> {
    let mut orders: Vec<Order> = docs
        .find::<NewOrder, _>(ORDERS, |order| &order.uid == user)?
        .into_iter()
        .map(|(id, details)| Order {
            id: OrderId::from_string(id),
            details,
        })
        .collect();

    orders.sort_by(|a, b| b.details.order_date.cmp(&a.details.order_date));

    Ok(orders)
}

#[async_trait]
impl OrdersService for DocOrdersService {
    async fn create_order(&self, order: NewOrder) -> Result<OrderId, OrdersServiceError> {
        let id = OrderId::from_string(self.docs.insert(ORDERS, &order)?);

        info!(order = %id, uid = %order.uid, total = order.total, "order created");

        Ok(id)
    }

    async fn get_order(&self, order: OrderId) -> Result<Order, OrdersServiceError> {
        let details = self
            .docs
            .get::<NewOrder>(ORDERS, order.as_str())?
            .ok_or(OrdersServiceError::NotFound)?;

        Ok(Order { id: order, details })
    }

    async fn list_orders(&self, user: UserId) -> Result<Vec<Order>, OrdersServiceError> {
        orders_for(&self.docs, &user)
    }

    async fn subscribe_orders(&self, user: UserId) -> Result<OrderSubscription, OrdersServiceError> {
        // Subscribe before the first read so no write falls between the two.
        let mut changes = self.docs.subscribe();

        let (sender, receiver) = watch::channel(orders_for(&self.docs, &user)?);

        let docs = self.docs.clone();

        let listener = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) if change.collection != ORDERS => continue,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }

                match orders_for(&docs, &user) {
                    Ok(orders) => {
                        if sender.send(orders).is_err() {
                            break;
                        }
                    }
                    Err(error) => warn!(uid = %user, %error, "failed to refresh order history"),
                }
            }

            debug!(uid = %user, "order history listener stopped");
        });

        Ok(OrderSubscription::new(receiver, listener))
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Write a new order document and return its id.
    async fn create_order(&self, order: NewOrder) -> Result<OrderId, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderId) -> Result<Order, OrdersServiceError>;

    /// A user's orders, newest first.
    async fn list_orders(&self, user: UserId) -> Result<Vec<Order>, OrdersServiceError>;

    /// A user's orders, kept up to date until the subscription is dropped.
    async fn subscribe_orders(&self, user: UserId) -> Result<OrderSubscription, OrdersServiceError>;
}
