//! Cart service.

use std::{
    num::NonZeroU32,
    sync::{Arc, Mutex},
};

use mockall::automock;
use tracing::{debug, warn};

use crate::{
    domain::{
        cart::models::{self, CartLineItem},
        menu::models::MenuItemId,
    },
    storage::{KeyValueStore, KeyValueStoreExt},
    sync::lock,
};

/// Storage key holding the persisted cart.
pub const CART_KEY: &str = "cart";

/// Cart backed by the persistent key-value mirror.
///
/// The whole line list is written back after every mutation. A failed write is
/// logged and the in-memory cart stays authoritative for this session.
pub struct LocalCartService {
    lines: Mutex<Vec<CartLineItem>>,
    storage: Arc<dyn KeyValueStore>,
}

impl LocalCartService {
    /// Restore the cart saved in `storage`; anything unreadable starts empty.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let lines = storage
            .read_json::<Vec<CartLineItem>>(CART_KEY)
            .unwrap_or_default();

        debug!(lines = lines.len(), "cart restored");

        Self {
            lines: Mutex::new(lines),
            storage,
        }
    }

    fn mutate<F>(&self, change: F)
    where
        F: FnOnce(&mut Vec<CartLineItem>) -> bool,
    {
        let mut lines = lock(&self.lines);

        if !change(&mut lines) {
            return;
        }

        if let Err(error) = self.storage.write_json(CART_KEY, lines.as_slice()) {
            warn!(%error, "failed to persist cart");
        }
    }
}

impl CartService for LocalCartService {
    fn items(&self) -> Vec<CartLineItem> {
        lock(&self.lines).clone()
    }

    fn add_to_cart(&self, item: CartLineItem) {
        self.mutate(|lines| {
            // Lines merge on menu item id alone; the incoming customization is dropped.
            match lines.iter_mut().find(|line| line.id == item.id) {
                Some(line) => line.quantity = line.quantity.saturating_add(item.quantity.get()),
                None => lines.push(item),
            }

            true
        });
    }

    fn increase_quantity(&self, item: &MenuItemId) {
        self.mutate(|lines| {
            let Some(line) = lines.iter_mut().find(|line| &line.id == item) else {
                return false;
            };

            line.quantity = line.quantity.saturating_add(1);

            true
        });
    }

    fn decrease_quantity(&self, item: &MenuItemId) {
        self.mutate(|lines| {
            let Some(index) = lines.iter().position(|line| &line.id == item) else {
                return false;
            };

            let Some(line) = lines.get_mut(index) else {
                return false;
            };

            match NonZeroU32::new(line.quantity.get() - 1) {
                Some(quantity) => line.quantity = quantity,
                None => {
                    lines.remove(index);
                }
            }

            true
        });
    }

    fn clear_cart(&self) {
        self.mutate(|lines| {
            lines.clear();

            true
        });
    }
}

#[automock]
pub trait CartService: Send + Sync {
    /// Current lines, in insertion order.
    fn items(&self) -> Vec<CartLineItem>;

    /// Add a line, merging into an existing line for the same menu item.
    fn add_to_cart(&self, item: CartLineItem);

    /// Add one unit to the line for `item`, if any.
    fn increase_quantity(&self, item: &MenuItemId);

    /// Remove one unit from the line for `item`, dropping the line at zero.
    fn decrease_quantity(&self, item: &MenuItemId);

    /// Remove every line.
    fn clear_cart(&self);

    /// Units across every line, for the header badge.
    fn item_count(&self) -> u64 {
        models::item_count(&self.items())
    }

    /// Sum of price times quantity over every line.
    fn subtotal(&self) -> u64 {
        models::subtotal(&self.items())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::cart::models::{Size, Temperature, Toppings},
        storage::{MemoryStore, MockKeyValueStore, StorageError},
    };

    use super::*;

    fn line(id: &str, price: u64, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: MenuItemId::from_string(id),
            name: format!("{id} tea"),
            price,
            quantity: NonZeroU32::new(quantity).unwrap_or(NonZeroU32::MIN),
            size: Size::Medium,
            temperature: Temperature::WithIce,
            toppings: Toppings::new(),
        }
    }

    fn cart() -> (Arc<MemoryStore>, LocalCartService) {
        let storage = Arc::new(MemoryStore::new());
        let cart = LocalCartService::load(storage.clone());

        (storage, cart)
    }

    #[test]
    fn adding_same_item_sums_quantities() {
        let (_, cart) = cart();

        cart.add_to_cart(line("taro", 1290, 1));
        cart.add_to_cart(line("taro", 1290, 2));

        let items = cart.items();

        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|line| line.quantity.get()), Some(3));
    }

    #[test]
    fn merge_ignores_differing_customization() {
        let (_, cart) = cart();

        cart.add_to_cart(line("taro", 1290, 1));
        cart.add_to_cart(CartLineItem {
            size: Size::Large,
            temperature: Temperature::Hot,
            toppings: ["pudding"].into_iter().collect(),
            ..line("taro", 1290, 1)
        });

        let items = cart.items();

        assert_eq!(items.len(), 1);

        let merged = items.first();

        assert_eq!(merged.map(|line| line.quantity.get()), Some(2));
        assert_eq!(merged.map(|line| line.size), Some(Size::Medium));
        assert_eq!(merged.map(|line| line.toppings.is_empty()), Some(true));
    }

    #[test]
    fn distinct_items_keep_insertion_order() {
        let (_, cart) = cart();

        cart.add_to_cart(line("taro", 1290, 1));
        cart.add_to_cart(line("matcha", 1490, 2));

        let ids: Vec<String> = cart
            .items()
            .into_iter()
            .map(|line| line.id.into_string())
            .collect();

        assert_eq!(ids, vec!["taro", "matcha"]);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), 1290 + 2 * 1490);
    }

    #[test]
    fn decrease_to_zero_removes_line_and_then_noops() {
        let (_, cart) = cart();
        let taro = MenuItemId::from_string("taro");

        cart.add_to_cart(line("taro", 1290, 2));

        cart.decrease_quantity(&taro);
        assert_eq!(cart.items().first().map(|line| line.quantity.get()), Some(1));

        cart.decrease_quantity(&taro);
        assert!(cart.items().is_empty());

        cart.decrease_quantity(&taro);
        cart.increase_quantity(&taro);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn every_mutation_is_persisted() -> TestResult {
        let (storage, cart) = cart();

        cart.add_to_cart(line("taro", 1290, 1));
        cart.increase_quantity(&MenuItemId::from_string("taro"));

        let saved: Option<Vec<CartLineItem>> = storage.read_json(CART_KEY);

        assert_eq!(saved, Some(cart.items()));

        cart.clear_cart();

        assert_eq!(storage.get(CART_KEY)?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn cart_is_restored_from_storage() {
        let (storage, cart) = cart();

        cart.add_to_cart(line("taro", 1290, 2));
        cart.add_to_cart(line("matcha", 1490, 1));

        let restored = LocalCartService::load(storage);

        assert_eq!(restored.items(), cart.items());
    }

    #[test]
    fn malformed_saved_cart_starts_empty() -> TestResult {
        let storage = Arc::new(MemoryStore::new());

        storage.set(CART_KEY, "{ not a cart")?;

        assert!(LocalCartService::load(storage).items().is_empty());

        Ok(())
    }

    #[test]
    fn failed_write_keeps_in_memory_cart() {
        let mut storage = MockKeyValueStore::new();

        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .times(1)
            .returning(|_, _| Err(StorageError::Io(std::io::Error::other("disk full"))));

        let cart = LocalCartService::load(Arc::new(storage));

        cart.add_to_cart(line("taro", 1290, 1));

        assert_eq!(cart.item_count(), 1);
    }
}
