//! Document store abstraction for persistence.

mod memory;
mod remote;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

use crate::document::{Document, DocumentDraft, DocumentPatch};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Store error: {0}")]
    Internal(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for document store backends.
///
/// Implementations persist documents in a hosted row store or in memory.
/// All operations are scoped to the owning user: a caller never sees or
/// mutates another user's documents.
pub trait DocumentStore: Send + Sync {
    /// List all documents owned by the current user,
    /// most-recently-updated first.
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Document>>>;

    /// Fetch a single document, `None` if it does not exist
    /// or is owned by someone else.
    fn get(&self, id: &str) -> BoxFuture<'_, StoreResult<Option<Document>>>;

    /// Create a document. The store assigns id, owner and timestamps.
    fn create(&self, draft: DocumentDraft) -> BoxFuture<'_, StoreResult<Document>>;

    /// Apply a partial update. Fields omitted from the patch are left
    /// unchanged; `updated_at` is refreshed by the store.
    fn update(&self, id: &str, patch: DocumentPatch) -> BoxFuture<'_, StoreResult<Document>>;

    /// Delete a document. Permanent, no soft delete.
    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>>;
}
