//! Menu service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    documents::{Documents, collections::MENU},
    domain::menu::{
        errors::MenuServiceError,
        models::{MenuItem, MenuItemId, MenuItemUpdate, NewMenuItem},
        records::MenuItemRecord,
    },
};

#[derive(Debug, Clone)]
pub struct DocMenuService {
    docs: Documents,
}

impl DocMenuService {
    #[must_use]
    pub fn new(docs: Documents) -> Self {
        Self { docs }
    }

    fn load(&self, id: &MenuItemId) -> Result<MenuItemRecord, MenuServiceError> {
        self.docs
            .get::<MenuItemRecord>(MENU, id.as_str())?
            .ok_or(MenuServiceError::NotFound)
    }
}

fn validate(record: &MenuItemRecord) -> Result<(), MenuServiceError> {
    if record.product_name.trim().is_empty() {
        return Err(MenuServiceError::InvalidData("product name is required"));
    }

    if record.price == 0 {
        return Err(MenuServiceError::InvalidData("price must be positive"));
    }

    Ok(())
}

#[async_trait]
impl MenuService for DocMenuService {
    async fn list_items(&self) -> Result<Vec<MenuItem>, MenuServiceError> {
        let mut items: Vec<MenuItem> = self
            .docs
            .find::<MenuItemRecord, _>(MENU, |_| true)?
            .into_iter()
            .map(|(id, record)| record.into_item(MenuItemId::from_string(id)))
            .collect();

        items.sort_by(|a, b| a.product_name.cmp(&b.product_name));

        Ok(items)
    }

    async fn get_item(&self, item: MenuItemId) -> Result<MenuItem, MenuServiceError> {
        Ok(self.load(&item)?.into_item(item))
    }

    async fn create_item(&self, item: NewMenuItem) -> Result<MenuItem, MenuServiceError> {
        let record = MenuItemRecord::from(item);

        validate(&record)?;

        let id = MenuItemId::from_string(self.docs.insert(MENU, &record)?);

        info!(item = %id, name = %record.product_name, "menu item created");

        Ok(record.into_item(id))
    }

    async fn update_item(
        &self,
        item: MenuItemId,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, MenuServiceError> {
        let mut record = self.load(&item)?;

        if let Some(product_name) = update.product_name {
            record.product_name = product_name;
        }

        if let Some(price) = update.price {
            record.price = price;
        }

        if let Some(description) = update.description {
            record.description = description;
        }

        if let Some(preparation_time) = update.preparation_time {
            record.preparation_time = preparation_time;
        }

        if let Some(image) = update.image {
            record.image = image;
        }

        validate(&record)?;

        self.docs.set(MENU, item.as_str(), &record)?;

        info!(item = %item, "menu item updated");

        Ok(record.into_item(item))
    }

    async fn delete_item(&self, item: MenuItemId) -> Result<(), MenuServiceError> {
        if !self.docs.delete(MENU, item.as_str())? {
            return Err(MenuServiceError::NotFound);
        }

        info!(item = %item, "menu item deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait MenuService: Send + Sync {
    /// Every menu item, ordered by name.
    async fn list_items(&self) -> Result<Vec<MenuItem>, MenuServiceError>;

    /// Retrieve a single menu item.
    async fn get_item(&self, item: MenuItemId) -> Result<MenuItem, MenuServiceError>;

    /// Create a menu item.
    async fn create_item(&self, item: NewMenuItem) -> Result<MenuItem, MenuServiceError>;

    /// Update the given fields of a menu item.
    async fn update_item(
        &self,
        item: MenuItemId,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, MenuServiceError>;

    /// Delete a menu item.
    async fn delete_item(&self, item: MenuItemId) -> Result<(), MenuServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn taro() -> NewMenuItem {
        NewMenuItem {
            product_name: "Taro Milk Tea".to_string(),
            price: 1290,
            description: "Creamy taro".to_string(),
            preparation_time: 4,
            image: "taro.png".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_item() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx.app.menu.create_item(taro()).await?;
        let fetched = ctx.app.menu.get_item(created.id.clone()).await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.preparation_time, 4);

        Ok(())
    }

    #[tokio::test]
    async fn list_items_is_sorted_by_name() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.menu.create_item(taro()).await?;
        ctx.app
            .menu
            .create_item(NewMenuItem {
                product_name: "Brown Sugar Boba".to_string(),
                ..taro()
            })
            .await?;

        let names: Vec<String> = ctx
            .app
            .menu
            .list_items()
            .await?
            .into_iter()
            .map(|item| item.product_name)
            .collect();

        assert_eq!(names, vec!["Brown Sugar Boba", "Taro Milk Tea"]);

        Ok(())
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() -> TestResult {
        let ctx = TestContext::new();

        let created = ctx.app.menu.create_item(taro()).await?;

        let updated = ctx
            .app
            .menu
            .update_item(
                created.id.clone(),
                MenuItemUpdate {
                    price: Some(1490),
                    ..MenuItemUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.price, 1490);
        assert_eq!(updated.product_name, created.product_name);
        assert_eq!(ctx.app.menu.get_item(created.id).await?.price, 1490);

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let ctx = TestContext::new();

        let result = ctx
            .app
            .menu
            .create_item(NewMenuItem {
                product_name: "  ".to_string(),
                ..taro()
            })
            .await;

        assert!(matches!(result, Err(MenuServiceError::InvalidData(_))));
    }

    #[tokio::test]
    async fn delete_unknown_item_returns_not_found() {
        let ctx = TestContext::new();

        let result = ctx
            .app
            .menu
            .delete_item(MenuItemId::from_string("missing"))
            .await;

        assert!(matches!(result, Err(MenuServiceError::NotFound)));
    }
}
