use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use wardrobe_core::errors::StoreError;
use wardrobe_core::ports::{BlobStore, StorageReference};

use crate::validate_blob_path;

/// Blob store rooted at a local directory.
///
/// A blob at `clothes/tee.jpg_1718000000000` lives at
/// `<root>/clothes/tee.jpg_1718000000000`. URLs point at `public_base_url` when
/// one is configured (a static file server in front of the root), otherwise at
/// the absolute `file://` location.
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), public_base_url: None }
    }

    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url.map(|url| url.trim_end_matches('/').to_string());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_file(&self, path: &str) -> Result<PathBuf, StoreError> {
        validate_blob_path(path)?;
        Ok(self.root.join(path))
    }
}

fn io_error(path: &str, error: io::Error) -> StoreError {
    match error.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
        io::ErrorKind::AlreadyExists => {
            StoreError::Backend(format!("{path}: blob already exists"))
        }
        _ => StoreError::Backend(format!("{path}: {error}")),
    }
}

fn relative_key(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join("/"))
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    /// Never replaces an existing blob: each storage path holds one upload.
    async fn upload(&self, bytes: Vec<u8>, path: &str) -> Result<StorageReference, StoreError> {
        let file = self.blob_file(path)?;
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| io_error(path, e))?;
        }
        let size = bytes.len();
        let mut handle = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file)
            .await
            .map_err(|e| io_error(path, e))?;
        handle.write_all(&bytes).await.map_err(|e| io_error(path, e))?;
        handle.flush().await.map_err(|e| io_error(path, e))?;
        debug!(storage_path = %path, size_bytes = size, "blob written");
        Ok(StorageReference { full_path: path.to_string() })
    }

    async fn resolve_url(&self, reference: &StorageReference) -> Result<String, StoreError> {
        let path = reference.full_path.as_str();
        let file = self.blob_file(path)?;
        if !tokio::fs::try_exists(&file).await.map_err(|e| io_error(path, e))? {
            return Err(StoreError::NotFound(path.to_string()));
        }

        if let Some(base_url) = &self.public_base_url {
            return Ok(format!("{base_url}/{path}"));
        }
        let absolute = std::path::absolute(&file).map_err(|e| io_error(path, e))?;
        Ok(format!("file://{}", absolute.display()))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let file = self.blob_file(path)?;
        tokio::fs::remove_file(&file).await.map_err(|e| io_error(path, e))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let root_label = self.root.display().to_string();
        if !tokio::fs::try_exists(&self.root).await.map_err(|e| io_error(&root_label, e))? {
            return Ok(Vec::new());
        }

        let mut pending = vec![self.root.clone()];
        let mut found = Vec::new();
        while let Some(dir) = pending.pop() {
            let mut entries =
                tokio::fs::read_dir(&dir).await.map_err(|e| io_error(&root_label, e))?;
            while let Some(entry) =
                entries.next_entry().await.map_err(|e| io_error(&root_label, e))?
            {
                let file_type = entry.file_type().await.map_err(|e| io_error(&root_label, e))?;
                let entry_path = entry.path();
                if file_type.is_dir() {
                    pending.push(entry_path);
                } else if let Some(key) = relative_key(&self.root, &entry_path) {
                    if key.starts_with(prefix) {
                        found.push(key);
                    }
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use wardrobe_core::errors::StoreError;
    use wardrobe_core::ports::{BlobStore, StorageReference};

    use super::FsBlobStore;

    #[tokio::test]
    async fn upload_writes_under_the_root_and_resolves_a_file_url() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsBlobStore::new(dir.path());

        let reference = store.upload(vec![7, 7, 7], "clothes/tee.jpg_42").await.expect("upload");
        let url = store.resolve_url(&reference).await.expect("resolve");

        let on_disk = std::fs::read(dir.path().join("clothes/tee.jpg_42")).expect("blob file");
        assert_eq!(on_disk, vec![7, 7, 7]);
        assert!(url.starts_with("file://"), "unexpected url {url}");
        assert!(url.ends_with("clothes/tee.jpg_42"), "unexpected url {url}");
    }

    #[tokio::test]
    async fn public_base_url_takes_precedence() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsBlobStore::new(dir.path())
            .with_public_base_url(Some("https://cdn.example.test/wardrobe/".to_string()));

        let reference = store.upload(vec![1], "clothes/cap.jpg_1").await.expect("upload");

        assert_eq!(
            store.resolve_url(&reference).await.expect("resolve"),
            "https://cdn.example.test/wardrobe/clothes/cap.jpg_1"
        );
    }

    #[tokio::test]
    async fn traversal_paths_never_touch_the_filesystem() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsBlobStore::new(dir.path().join("root"));

        let upload = store.upload(vec![1], "../escape").await;
        let delete = store.delete("/etc/hosts").await;
        let resolve =
            store.resolve_url(&StorageReference { full_path: "clothes/../../x".to_string() }).await;

        assert_eq!(upload, Err(StoreError::InvalidPath("../escape".to_string())));
        assert_eq!(delete, Err(StoreError::InvalidPath("/etc/hosts".to_string())));
        assert!(matches!(resolve, Err(StoreError::InvalidPath(_))));
        assert!(!dir.path().join("escape").exists());
    }

    #[tokio::test]
    async fn deleting_a_missing_blob_reports_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsBlobStore::new(dir.path());

        assert_eq!(
            store.delete("clothes/ghost").await,
            Err(StoreError::NotFound("clothes/ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn upload_refuses_to_replace_an_existing_blob() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsBlobStore::new(dir.path());
        store.upload(vec![1, 1], "clothes/tee.jpg_7").await.expect("first upload");

        let second = store.upload(vec![2, 2, 2], "clothes/tee.jpg_7").await;

        assert!(matches!(second, Err(StoreError::Backend(_))));
        let on_disk = std::fs::read(dir.path().join("clothes/tee.jpg_7")).expect("blob file");
        assert_eq!(on_disk, vec![1, 1], "first upload is kept");
    }

    #[tokio::test]
    async fn list_walks_nested_directories_under_the_prefix() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsBlobStore::new(dir.path());
        store.upload(vec![0], "clothes/b.jpg_2").await.expect("upload");
        store.upload(vec![0], "clothes/a.jpg_1").await.expect("upload");
        store.upload(vec![0], "archive/old.jpg_0").await.expect("upload");

        let listed = store.list("clothes/").await.expect("list");
        assert_eq!(listed, vec!["clothes/a.jpg_1".to_string(), "clothes/b.jpg_2".to_string()]);

        store.delete("clothes/a.jpg_1").await.expect("delete");
        assert_eq!(store.list("clothes/").await.expect("list"), vec!["clothes/b.jpg_2"]);
    }

    #[tokio::test]
    async fn listing_a_missing_root_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = FsBlobStore::new(dir.path().join("not-created-yet"));

        assert!(store.list("clothes/").await.expect("list").is_empty());
    }
}
