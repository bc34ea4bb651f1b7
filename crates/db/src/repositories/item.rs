use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;
use uuid::Uuid;

use wardrobe_core::domain::item::{
    ClothingItem, ClothingType, FieldUpdate, ItemId, NewItem, Occasion,
};
use wardrobe_core::errors::StoreError;
use wardrobe_core::filter::{FieldEquals, Predicate};
use wardrobe_core::ports::ItemStore;

use super::RepositoryError;
use crate::DbPool;

const SELECT_ITEMS: &str = "SELECT id, item_type, occasion, image_url, storage_path, wear_count, \
                            created_at FROM clothing_item";

pub struct SqlItemStore {
    pool: DbPool,
}

impl SqlItemStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, predicate: &Predicate) -> Result<Vec<ClothingItem>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_ITEMS);
        for (index, condition) in predicate.conditions().iter().enumerate() {
            builder.push(if index == 0 { " WHERE " } else { " AND " });
            match condition {
                FieldEquals::Type(item_type) => {
                    builder.push("item_type = ").push_bind(item_type.as_str());
                }
                FieldEquals::Occasion(occasion) => {
                    builder.push("occasion = ").push_bind(occasion.as_str());
                }
            }
        }
        builder.push(" ORDER BY created_at ASC, rowid ASC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_item).collect()
    }

    async fn insert(&self, item: NewItem) -> Result<ClothingItem, RepositoryError> {
        let created = ClothingItem {
            id: ItemId(Uuid::new_v4().to_string()),
            item_type: item.item_type,
            occasion: item.occasion,
            image_url: item.image_url,
            storage_path: item.storage_path,
            wear_count: 0,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO clothing_item
                 (id, item_type, occasion, image_url, storage_path, wear_count, created_at)
             VALUES (?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&created.id.0)
        .bind(created.item_type.as_str())
        .bind(created.occasion.as_str())
        .bind(&created.image_url)
        .bind(&created.storage_path)
        .bind(created.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    async fn apply(&self, id: &ItemId, update: FieldUpdate) -> Result<(), RepositoryError> {
        let result = match update {
            FieldUpdate::WearCount(count) => {
                sqlx::query("UPDATE clothing_item SET wear_count = ? WHERE id = ?")
                    .bind(i64::from(count))
                    .bind(&id.0)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.0.clone()));
        }
        debug!(item_id = %id, field = update.field_name(), "clothing item updated");
        Ok(())
    }

    async fn remove(&self, id: &ItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM clothing_item WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.0.clone()));
        }
        Ok(())
    }
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<ClothingItem, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let item_type: String =
        row.try_get("item_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let occasion: String =
        row.try_get("occasion").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let image_url: String =
        row.try_get("image_url").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let storage_path: String =
        row.try_get("storage_path").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let wear_count: i64 =
        row.try_get("wear_count").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let item_type = item_type
        .parse::<ClothingType>()
        .map_err(|e| RepositoryError::Decode(format!("item `{id}`: {e}")))?;
    let occasion = occasion
        .parse::<Occasion>()
        .map_err(|e| RepositoryError::Decode(format!("item `{id}`: {e}")))?;
    let wear_count = u32::try_from(wear_count).map_err(|_| {
        RepositoryError::Decode(format!("item `{id}` has wear_count {wear_count} out of range"))
    })?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("item `{id}` created_at: {e}")))?;

    Ok(ClothingItem {
        id: ItemId(id),
        item_type,
        occasion,
        image_url,
        storage_path,
        wear_count,
        created_at,
    })
}

#[async_trait::async_trait]
impl ItemStore for SqlItemStore {
    async fn list(&self, predicate: &Predicate) -> Result<Vec<ClothingItem>, StoreError> {
        Ok(self.fetch(predicate).await?)
    }

    async fn create(&self, item: NewItem) -> Result<ClothingItem, StoreError> {
        Ok(self.insert(item).await?)
    }

    async fn update_field(&self, id: &ItemId, update: FieldUpdate) -> Result<(), StoreError> {
        Ok(self.apply(id, update).await?)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
        Ok(self.remove(id).await?)
    }
}
