//! Menu Models

use crate::ids::TypedId;

/// Menu Item Id
pub type MenuItemId = TypedId<MenuItem>;

/// Menu Item Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub product_name: String,
    pub price: u64,
    pub description: String,

    /// Minutes needed to prepare one unit.
    pub preparation_time: u32,

    /// Reference to the product image.
    pub image: String,
}

/// New Menu Item Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenuItem {
    pub product_name: String,
    pub price: u64,
    pub description: String,
    pub preparation_time: u32,
    pub image: String,
}

/// Menu Item Update Model. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItemUpdate {
    pub product_name: Option<String>,
    pub price: Option<u64>,
    pub description: Option<String>,
    pub preparation_time: Option<u32>,
    pub image: Option<String>,
}
