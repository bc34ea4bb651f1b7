pub mod config;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod lifecycle;
pub mod ports;
pub mod selection;
pub mod view;

pub use domain::item::{
    ClothingItem, ClothingType, FieldUpdate, ItemId, NewItem, Occasion, WearIncrement,
};
pub use errors::{
    ApplicationError, DomainError, InterfaceError, SelectionError, StoreError,
};
pub use filter::{build_query, FieldEquals, ItemFilter, Predicate};
pub use lifecycle::{
    AddItemRequest, DeleteOutcome, DeletePhase, ItemLifecycle, LifecycleError, Notice, SweepReport,
};
pub use ports::{
    BlobStore, CompressedImage, CompressionError, CompressionOptions, ImageCompressor,
    ImageUpload, ItemStore, StorageReference,
};
pub use selection::{RandomPick, SelectionEngine};
pub use view::{Layout, RankedView, WardrobeView};
