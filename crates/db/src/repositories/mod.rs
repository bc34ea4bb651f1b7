use thiserror::Error;

use wardrobe_core::errors::StoreError;

pub mod item;
pub mod memory;

pub use item::SqlItemStore;
pub use memory::InMemoryItemStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("no clothing item with id `{0}`")]
    NotFound(String),
}

impl From<RepositoryError> for StoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => Self::Backend(error.to_string()),
            RepositoryError::Decode(message) => Self::Decode(message),
            RepositoryError::NotFound(id) => Self::NotFound(id),
        }
    }
}
