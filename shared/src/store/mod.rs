use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// A schema-less document store addressed by collection name and document id.
///
/// The HTTP layer owns one handle for the lifetime of the process and shares
/// it across requests; implementations must be safe for concurrent use.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document, or `None` if no document exists at `id`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create or fully replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Remove the document at `id`. Succeeds whether or not it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Fetch every document in the collection, in store-defined order.
    async fn stream_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}
