use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use wardrobe_core::domain::item::{ClothingItem, FieldUpdate, ItemId, NewItem};
use wardrobe_core::errors::StoreError;
use wardrobe_core::filter::Predicate;
use wardrobe_core::ports::ItemStore;

/// Item store kept in insertion order, for tests and dry runs.
#[derive(Default)]
pub struct InMemoryItemStore {
    items: RwLock<Vec<ClothingItem>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(items: Vec<ClothingItem>) -> Self {
        Self { items: RwLock::new(items) }
    }
}

#[async_trait::async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<ClothingItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|item| predicate.matches(item)).cloned().collect())
    }

    async fn create(&self, item: NewItem) -> Result<ClothingItem, StoreError> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.storage_path == item.storage_path) {
            return Err(StoreError::Backend(format!(
                "storage path `{}` is already recorded",
                item.storage_path
            )));
        }

        let created = ClothingItem {
            id: ItemId(Uuid::new_v4().to_string()),
            item_type: item.item_type,
            occasion: item.occasion,
            image_url: item.image_url,
            storage_path: item.storage_path,
            wear_count: 0,
            created_at: Utc::now(),
        };
        items.push(created.clone());
        Ok(created)
    }

    async fn update_field(&self, id: &ItemId, update: FieldUpdate) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))?;
        match update {
            FieldUpdate::WearCount(count) => item.wear_count = count,
        }
        Ok(())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let position = items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.0.clone()))?;
        items.remove(position);
        Ok(())
    }
}
