//! Ordered create, wear and delete flows against the item and blob stores.
//!
//! Add is strictly compress -> upload -> create record. Delete is optimistic:
//! the item leaves the local view first, then the blob is removed, then the
//! record. A failed delete is reconciled by reloading from the item store rather
//! than by undoing the local removal.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::item::{ClothingItem, ClothingType, ItemId, NewItem, Occasion, WearIncrement};
use crate::errors::{ApplicationError, DomainError, SelectionError, StoreError};
use crate::filter::{ItemFilter, Predicate};
use crate::ports::{
    BlobStore, CompressionError, CompressionOptions, ImageCompressor, ImageUpload, ItemStore,
};
use crate::selection::{RandomPick, SelectionEngine};
use crate::view::WardrobeView;

pub const DEFAULT_KEY_PREFIX: &str = "clothes";
pub const DELETE_FAILED_NOTICE: &str = "Failed to delete item. Refresh to see correct list.";
pub const DELETE_CONFIRMATION_PROMPT: &str = "Are you sure you want to delete this item?";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("missing required input `{field}`")]
    MissingInput { field: &'static str },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Compression(#[from] CompressionError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("item `{0}` is not in the loaded set")]
    UnknownItem(ItemId),
}

impl From<LifecycleError> for ApplicationError {
    fn from(value: LifecycleError) -> Self {
        match value {
            LifecycleError::MissingInput { field } => Self::MissingInput(field.to_string()),
            LifecycleError::Domain(error) => Self::Domain(error),
            LifecycleError::Compression(error) => Self::Processing(error.to_string()),
            LifecycleError::Store(error) => Self::from(error),
            LifecycleError::UnknownItem(id) => Self::Domain(DomainError::InvariantViolation(
                format!("item `{id}` is not in the loaded set"),
            )),
        }
    }
}

/// Raw add-item form input. Every field is required.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddItemRequest {
    pub image: Option<ImageUpload>,
    pub item_type: Option<ClothingType>,
    pub occasion: Option<Occasion>,
}

impl AddItemRequest {
    /// Empty labels count as "not selected"; unknown labels are rejected.
    pub fn from_labels(
        image: Option<ImageUpload>,
        type_label: &str,
        occasion_label: &str,
    ) -> Result<Self, LifecycleError> {
        let item_type = match type_label.trim() {
            "" => None,
            label => Some(label.parse::<ClothingType>()?),
        };
        let occasion = match occasion_label.trim() {
            "" => None,
            label => Some(label.parse::<Occasion>()?),
        };
        Ok(Self { image, item_type, occasion })
    }

    fn require(self) -> Result<(ImageUpload, ClothingType, Occasion), LifecycleError> {
        let image = self.image.ok_or(LifecycleError::MissingInput { field: "image" })?;
        let item_type = self.item_type.ok_or(LifecycleError::MissingInput { field: "type" })?;
        let occasion = self.occasion.ok_or(LifecycleError::MissingInput { field: "occasion" })?;
        Ok((image, item_type, occasion))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Last step that completed before a delete failed.
///
/// `BlobDeleted` is the documented inconsistency window: the record still exists
/// but its `storage_path` no longer resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePhase {
    LocallyRemoved,
    BlobDeleted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted { item_id: ItemId },
    Failed { phase: DeletePhase, error: StoreError, notice: Notice, reconciled: bool },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

pub struct ItemLifecycle {
    items: Arc<dyn ItemStore>,
    blobs: Arc<dyn BlobStore>,
    compressor: Arc<dyn ImageCompressor>,
    options: CompressionOptions,
    key_prefix: String,
    engine: SelectionEngine,
}

impl ItemLifecycle {
    pub fn new(
        items: Arc<dyn ItemStore>,
        blobs: Arc<dyn BlobStore>,
        compressor: Arc<dyn ImageCompressor>,
    ) -> Self {
        Self {
            items,
            blobs,
            compressor,
            options: CompressionOptions::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            engine: SelectionEngine::new(),
        }
    }

    pub fn with_compression(mut self, options: CompressionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into().trim_matches('/').to_string();
        self
    }

    /// Replaces the view's items with the store's current contents for its filter.
    ///
    /// On failure the previously loaded items are kept.
    pub async fn reload(&self, view: &mut WardrobeView) -> Result<usize, LifecycleError> {
        let predicate = view.predicate();
        match self.items.list(&predicate).await {
            Ok(items) => {
                let count = items.len();
                view.replace_items(items);
                debug!(
                    event_name = "wardrobe.view.reloaded",
                    item_count = count,
                    "items reloaded"
                );
                Ok(count)
            }
            Err(err) => {
                error!(
                    event_name = "wardrobe.view.reload_failed",
                    error = %err,
                    "error fetching clothes"
                );
                Err(err.into())
            }
        }
    }

    pub async fn apply_filter(
        &self,
        view: &mut WardrobeView,
        filter: ItemFilter,
    ) -> Result<usize, LifecycleError> {
        view.set_filter(filter);
        self.reload(view).await
    }

    pub async fn add_item(&self, request: AddItemRequest) -> Result<ClothingItem, LifecycleError> {
        let (image, item_type, occasion) = request.require()?;

        let compressed = self.compressor.compress(image, &self.options).map_err(|err| {
            warn!(
                event_name = "wardrobe.item.compress_failed",
                error = %err,
                "image compression failed"
            );
            LifecycleError::from(err)
        })?;

        let path = self.blob_path(&compressed.file_name);
        let reference = self.blobs.upload(compressed.bytes, &path).await.map_err(|err| {
            error!(
                event_name = "wardrobe.item.upload_failed",
                storage_path = %path,
                error = %err,
                "error adding item"
            );
            LifecycleError::from(err)
        })?;

        let image_url = match self.blobs.resolve_url(&reference).await {
            Ok(url) => url,
            Err(err) => {
                self.log_orphan(&reference.full_path, &err);
                return Err(err.into());
            }
        };

        let new_item =
            NewItem { item_type, occasion, image_url, storage_path: reference.full_path.clone() };
        match self.items.create(new_item).await {
            Ok(item) => {
                info!(
                    event_name = "wardrobe.item.created",
                    item_id = %item.id,
                    item_type = %item.item_type,
                    occasion = %item.occasion,
                    storage_path = %item.storage_path,
                    "clothing item added"
                );
                Ok(item)
            }
            Err(err) => {
                self.log_orphan(&reference.full_path, &err);
                Err(err.into())
            }
        }
    }

    /// Persists `wear_count + 1` for a loaded item, then reloads.
    pub async fn mark_worn(
        &self,
        view: &mut WardrobeView,
        id: &ItemId,
    ) -> Result<WearIncrement, LifecycleError> {
        let item = view.find(id).ok_or_else(|| LifecycleError::UnknownItem(id.clone()))?;
        let increment = self.engine.mark_worn(item);
        self.apply_increment(&increment).await?;
        self.reload(view).await?;
        Ok(increment)
    }

    /// Picks uniformly from the loaded items and records the wear.
    ///
    /// An empty set is a silent no-op.
    pub async fn pick_random<R>(
        &self,
        view: &mut WardrobeView,
        rng: &mut R,
    ) -> Result<Option<RandomPick>, LifecycleError>
    where
        R: Rng + ?Sized,
    {
        let pick = match self.engine.pick_random(view.items(), rng) {
            Ok(pick) => pick,
            Err(SelectionError::EmptySet) => {
                debug!(event_name = "wardrobe.pick.empty_set", "nothing to pick from");
                return Ok(None);
            }
        };

        info!(
            event_name = "wardrobe.pick.selected",
            item_id = %pick.item.id,
            "{}",
            pick.message()
        );
        self.apply_increment(&pick.increment).await?;
        self.reload(view).await?;
        Ok(Some(pick))
    }

    /// Optimistic delete, gated on `confirm`.
    pub async fn delete_item<F>(
        &self,
        view: &mut WardrobeView,
        id: &ItemId,
        storage_path: &str,
        confirm: F,
    ) -> DeleteOutcome
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_CONFIRMATION_PROMPT) {
            debug!(event_name = "wardrobe.item.delete_declined", item_id = %id, "delete declined");
            return DeleteOutcome::Declined;
        }

        view.remove_local(id);

        match self.blobs.delete(storage_path).await {
            Ok(()) => {}
            // Left behind by an earlier delete that failed after the blob step.
            Err(StoreError::NotFound(_)) => {
                warn!(
                    event_name = "wardrobe.item.blob_already_removed",
                    item_id = %id,
                    storage_path = %storage_path,
                    "blob already gone; deleting the record"
                );
            }
            Err(err) => {
                return self
                    .reconcile_failed_delete(view, id, DeletePhase::LocallyRemoved, err)
                    .await;
            }
        }

        if let Err(err) = self.items.delete(id).await {
            return self.reconcile_failed_delete(view, id, DeletePhase::BlobDeleted, err).await;
        }

        info!(
            event_name = "wardrobe.item.deleted",
            item_id = %id,
            storage_path = %storage_path,
            "clothing item deleted"
        );
        DeleteOutcome::Deleted { item_id: id.clone() }
    }

    /// Deletes blobs under the key prefix that no record references.
    ///
    /// Assumes no add is in flight; a blob uploaded but not yet recorded would be swept.
    pub async fn sweep_orphan_blobs(&self) -> Result<SweepReport, LifecycleError> {
        let records = self.items.list(&Predicate::match_all()).await?;
        let referenced: HashSet<String> =
            records.into_iter().map(|item| item.storage_path).collect();

        let prefix = format!("{}/", self.key_prefix);
        let stored = self.blobs.list(&prefix).await?;

        let mut report = SweepReport { scanned: stored.len(), ..SweepReport::default() };
        for path in stored {
            if referenced.contains(&path) {
                continue;
            }
            match self.blobs.delete(&path).await {
                Ok(()) => {
                    info!(
                        event_name = "wardrobe.sweep.removed",
                        storage_path = %path,
                        "orphaned blob removed"
                    );
                    report.removed.push(path);
                }
                Err(err) => {
                    warn!(
                        event_name = "wardrobe.sweep.remove_failed",
                        storage_path = %path,
                        error = %err,
                        "could not remove orphaned blob"
                    );
                    report.failed.push(path);
                }
            }
        }

        Ok(report)
    }

    async fn apply_increment(&self, increment: &WearIncrement) -> Result<(), LifecycleError> {
        self.items.update_field(&increment.item_id, increment.as_update()).await.map_err(|err| {
            error!(
                event_name = "wardrobe.item.mark_worn_failed",
                item_id = %increment.item_id,
                error = %err,
                "error marking as worn"
            );
            LifecycleError::from(err)
        })?;
        info!(
            event_name = "wardrobe.item.worn",
            item_id = %increment.item_id,
            wear_count = increment.to,
            "wear count incremented"
        );
        Ok(())
    }

    async fn reconcile_failed_delete(
        &self,
        view: &mut WardrobeView,
        id: &ItemId,
        phase: DeletePhase,
        err: StoreError,
    ) -> DeleteOutcome {
        error!(
            event_name = "wardrobe.item.delete_failed",
            item_id = %id,
            phase = ?phase,
            error = %err,
            "error deleting item"
        );
        let reconciled = self.reload(view).await.is_ok();
        DeleteOutcome::Failed {
            phase,
            error: err,
            notice: Notice::new(DELETE_FAILED_NOTICE),
            reconciled,
        }
    }

    fn blob_path(&self, file_name: &str) -> String {
        format!("{}/{}_{}", self.key_prefix, file_name, Utc::now().timestamp_millis())
    }

    fn log_orphan(&self, storage_path: &str, err: &StoreError) {
        warn!(
            event_name = "wardrobe.item.orphaned_blob",
            storage_path = %storage_path,
            error = %err,
            "record creation failed after upload; blob left for the orphan sweep"
        );
    }
}
