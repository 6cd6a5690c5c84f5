//! Metadata table for provisioned networks.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

/// Store error type.
pub use error::StoreError;
/// JSONL-backed table.
pub use file::FileMetadataStore;
/// Process-local table.
pub use memory::InMemoryMetadataStore;
/// Store interface and construction from config.
pub use store::{MetadataStore, store_from_config};
