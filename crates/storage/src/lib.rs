//! Blob storage backends and the JPEG image compressor.

use std::path::{Component, Path};

use wardrobe_core::errors::StoreError;

pub mod compress;
pub mod fs;
pub mod memory;

pub use compress::JpegCompressor;
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;

/// Accepts only relative, `/`-separated paths made of plain segments.
pub fn validate_blob_path(path: &str) -> Result<(), StoreError> {
    let invalid = || StoreError::InvalidPath(path.to_string());

    if path.trim().is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(invalid());
    }
    if !Path::new(path).components().all(|component| matches!(component, Component::Normal(_))) {
        return Err(invalid());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use wardrobe_core::errors::StoreError;

    use super::validate_blob_path;

    #[test]
    fn plain_relative_paths_are_accepted() {
        assert_eq!(validate_blob_path("clothes/tee.jpg_1718000000000"), Ok(()));
        assert_eq!(validate_blob_path("a"), Ok(()));
    }

    #[test]
    fn escaping_or_absolute_paths_are_rejected() {
        let rejected =
            ["", "/etc/passwd", "clothes/../../secret", "./clothes/a", "clothes//a", "a\\b"];
        for path in rejected {
            assert_eq!(
                validate_blob_path(path),
                Err(StoreError::InvalidPath(path.to_string())),
                "{path:?} should be rejected"
            );
        }
    }
}
