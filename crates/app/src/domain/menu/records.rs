//! Menu Records

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::domain::menu::models::{MenuItem, MenuItemId, NewMenuItem};

/// Menu document as stored in the `menu` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MenuItemRecord {
    #[serde(rename = "ProductName")]
    pub product_name: String,

    #[serde(rename = "Price", deserialize_with = "price_from_number_or_text")]
    pub price: u64,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "preparationTime", default)]
    pub preparation_time: u32,

    #[serde(rename = "id", default)]
    pub image: String,
}

impl MenuItemRecord {
    pub fn into_item(self, id: MenuItemId) -> MenuItem {
        MenuItem {
            id,
            product_name: self.product_name,
            price: self.price,
            description: self.description,
            preparation_time: self.preparation_time,
            image: self.image,
        }
    }
}

impl From<NewMenuItem> for MenuItemRecord {
    fn from(item: NewMenuItem) -> Self {
        Self {
            product_name: item.product_name,
            price: item.price,
            description: item.description,
            preparation_time: item.preparation_time,
            image: item.image,
        }
    }
}

impl From<&MenuItem> for MenuItemRecord {
    fn from(item: &MenuItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            price: item.price,
            description: item.description.clone(),
            preparation_time: item.preparation_time,
            image: item.image.clone(),
        }
    }
}

/// Prices entered through the admin form arrive as text.
fn price_from_number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(price) => Ok(price),
        Raw::Text(text) => text.trim().parse().map_err(D::Error::custom),
    }
}
