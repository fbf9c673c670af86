//! Object storage backends.
//!
//! `ObjectStore` exposes the three S3 primitives the publish protocol needs.
//! Listing is paged so callers can stop as soon as they find what they want.

mod memory;
mod r2;

use async_trait::async_trait;

pub use memory::{MemoryStore, StoreCalls};
pub use r2::R2Store;

/// Errors from a storage backend primitive.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid storage configuration: {0}")]
    Configuration(String),

    #[error("{0}")]
    Backend(String),
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPage {
    pub keys: Vec<String>,
    /// Continuation token for the next page, `None` when the listing is complete.
    pub next: Option<String>,
}

/// Minimal S3-compatible bucket operations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List keys starting with `prefix` (ListObjectsV2 semantics).
    async fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<KeyPage, StoreError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError>;
}
