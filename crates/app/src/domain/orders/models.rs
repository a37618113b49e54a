//! Order Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    auth::models::UserId,
    domain::{
        cart::models::{CartLineItem, Size, Temperature, Toppings},
        locations::Location,
    },
    ids::TypedId,
};

/// Order Id
pub type OrderId = TypedId<Order>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownMethod {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentMethod {
    Delivery,
    Pickup,
}

impl Display for FulfillmentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Card or bank transfer.
    #[default]
    Card,
    Cash,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Card => "card",
            Self::Cash => "cash",
        })
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "card" | "transfer" | "bank-transfer" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            _ => Err(UnknownMethod {
                kind: "payment method",
                value: value.to_string(),
            }),
        }
    }
}

/// Snapshot of one cart line inside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub name: String,
    pub size: Size,
    pub toppings: Toppings,
    pub temperature: Temperature,
    pub quantity: u32,
}

impl From<&CartLineItem> for OrderLine {
    fn from(line: &CartLineItem) -> Self {
        Self {
            name: line.name.clone(),
            size: line.size,
            toppings: line.toppings.clone(),
            temperature: line.temperature,
            quantity: line.quantity.get(),
        }
    }
}

/// New Order Model, stored as an `ordersHistory` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub uid: UserId,
    pub email: String,

    /// Display name at the time of ordering, or `"Unknown"`.
    pub name: String,

    pub delivery: bool,
    pub pick_up: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub items: Vec<OrderLine>,
    pub card: bool,
    pub cash: bool,
    pub order_date: Timestamp,

    /// Forint.
    pub total: u64,
}

impl NewOrder {
    #[must_use]
    pub const fn fulfillment(&self) -> FulfillmentMethod {
        if self.delivery {
            FulfillmentMethod::Delivery
        } else {
            FulfillmentMethod::Pickup
        }
    }

    #[must_use]
    pub const fn payment(&self) -> PaymentMethod {
        if self.cash {
            PaymentMethod::Cash
        } else {
            PaymentMethod::Card
        }
    }
}

/// Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub details: NewOrder,
}
