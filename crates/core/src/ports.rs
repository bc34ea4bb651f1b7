//! Collaborator interfaces the lifecycle manager drives.
//!
//! Record persistence, blob storage and image compression live outside the core;
//! `wardrobe-db` and `wardrobe-storage` provide SQLite, filesystem and in-memory
//! implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::item::{ClothingItem, FieldUpdate, ItemId, NewItem};
use crate::errors::StoreError;
use crate::filter::Predicate;

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Items matching `predicate`, in load (creation) order.
    async fn list(&self, predicate: &Predicate) -> Result<Vec<ClothingItem>, StoreError>;
    async fn create(&self, item: NewItem) -> Result<ClothingItem, StoreError>;
    async fn update_field(&self, id: &ItemId, update: FieldUpdate) -> Result<(), StoreError>;
    async fn delete(&self, id: &ItemId) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageReference {
    pub full_path: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, path: &str) -> Result<StorageReference, StoreError>;
    async fn resolve_url(&self, reference: &StorageReference) -> Result<String, StoreError>;
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
    /// Paths of every stored blob whose path starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// An image as handed over by the user, before compression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressionOptions {
    pub max_size_mb: f64,
    pub max_dimension: u32,
}

impl CompressionOptions {
    pub fn max_size_bytes(&self) -> usize {
        (self.max_size_mb * 1024.0 * 1024.0) as usize
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self { max_size_mb: 0.5, max_dimension: 800 }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompressionError {
    #[error("could not decode image `{file_name}`: {reason}")]
    Decode { file_name: String, reason: String },
    #[error("could not encode image `{file_name}`: {reason}")]
    Encode { file_name: String, reason: String },
}

pub trait ImageCompressor: Send + Sync {
    fn compress(
        &self,
        image: ImageUpload,
        options: &CompressionOptions,
    ) -> Result<CompressedImage, CompressionError>;
}
