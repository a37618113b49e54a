//! Cart Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroU32,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::domain::menu::models::{MenuItem, MenuItemId};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownChoice {
    kind: &'static str,
    value: String,
}

/// Cup size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl Display for Size {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = UnknownChoice;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(UnknownChoice {
                kind: "size",
                value: value.to_string(),
            }),
        }
    }
}

/// Serving temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temperature {
    #[serde(rename = "hot")]
    Hot,

    #[serde(rename = "no ice", alias = "no-ice")]
    NoIce,

    #[default]
    #[serde(rename = "with ice", alias = "with-ice")]
    WithIce,
}

impl Temperature {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::NoIce => "no ice",
            Self::WithIce => "with ice",
        }
    }
}

impl Display for Temperature {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Temperature {
    type Err = UnknownChoice;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', " ").as_str() {
            "hot" => Ok(Self::Hot),
            "no ice" => Ok(Self::NoIce),
            "with ice" => Ok(Self::WithIce),
            _ => Err(UnknownChoice {
                kind: "temperature",
                value: value.to_string(),
            }),
        }
    }
}

/// Set of topping names. Equality ignores order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Toppings(SmallVec<[String; 4]>);

impl Toppings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topping; duplicates are ignored.
    pub fn insert(&mut self, topping: impl Into<String>) {
        let topping = topping.into();

        if !self.contains(&topping) {
            self.0.push(topping);
        }
    }

    #[must_use]
    pub fn contains(&self, topping: &str) -> bool {
        self.0.iter().any(|existing| existing == topping)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Toppings {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|topping| other.contains(topping))
    }
}

impl Eq for Toppings {}

impl<S: Into<String>> FromIterator<S> for Toppings {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut toppings = Self::new();

        for topping in iter {
            toppings.insert(topping);
        }

        toppings
    }
}

impl Display for Toppings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_empty() {
            return f.write_str("no toppings");
        }

        for (index, topping) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }

            f.write_str(topping)?;
        }

        Ok(())
    }
}

/// Choices made on the menu page before ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customization {
    pub size: Size,
    pub temperature: Temperature,
    pub toppings: Toppings,
    pub quantity: NonZeroU32,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            size: Size::default(),
            temperature: Temperature::default(),
            toppings: Toppings::default(),
            quantity: NonZeroU32::MIN,
        }
    }
}

/// Cart Line Item Model
///
/// Persisted in the `cart` key as a JSON array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: MenuItemId,
    pub name: String,

    /// Unit price in forint.
    pub price: u64,

    pub quantity: NonZeroU32,

    #[serde(default)]
    pub size: Size,

    #[serde(default)]
    pub temperature: Temperature,

    #[serde(default)]
    pub toppings: Toppings,
}

impl CartLineItem {
    #[must_use]
    pub fn from_menu_item(item: &MenuItem, customization: Customization) -> Self {
        Self {
            id: item.id.clone(),
            name: item.product_name.clone(),
            price: item.price,
            quantity: customization.quantity,
            size: customization.size,
            temperature: customization.temperature,
            toppings: customization.toppings,
        }
    }

    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity.get()))
    }
}

/// Total number of units across `lines`.
#[must_use]
pub fn item_count(lines: &[CartLineItem]) -> u64 {
    lines
        .iter()
        .map(|line| u64::from(line.quantity.get()))
        .sum()
}

/// Sum of `price * quantity` across `lines`.
#[must_use]
pub fn subtotal(lines: &[CartLineItem]) -> u64 {
    lines
        .iter()
        .map(CartLineItem::line_total)
        .fold(0, u64::saturating_add)
}
