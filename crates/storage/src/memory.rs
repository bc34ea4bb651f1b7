use std::collections::BTreeMap;

use tokio::sync::RwLock;

use wardrobe_core::errors::StoreError;
use wardrobe_core::ports::{BlobStore, StorageReference};

use crate::validate_blob_path;

#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, bytes: Vec<u8>, path: &str) -> Result<StorageReference, StoreError> {
        validate_blob_path(path)?;
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(path) {
            return Err(StoreError::Backend(format!("{path}: blob already exists")));
        }
        blobs.insert(path.to_string(), bytes);
        Ok(StorageReference { full_path: path.to_string() })
    }

    async fn resolve_url(&self, reference: &StorageReference) -> Result<String, StoreError> {
        if !self.blobs.read().await.contains_key(&reference.full_path) {
            return Err(StoreError::NotFound(reference.full_path.clone()));
        }
        Ok(format!("memory://{}", reference.full_path))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        match self.blobs.write().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let blobs = self.blobs.read().await;
        Ok(blobs.keys().filter(|path| path.starts_with(prefix)).cloned().collect())
    }
}
