//! In-memory store implementation.

use super::{BoxFuture, DocumentStore, StoreError, StoreResult};
use crate::document::{Document, DocumentDraft, DocumentPatch};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory store for testing and offline use.
///
/// Assigns ids and timestamps itself and enforces the same per-user
/// ownership scoping the hosted backend applies.
pub struct MemoryStore {
    user_id: String,
    documents: RwLock<HashMap<String, Document>>,
}

/// Timestamp for a mutation, guaranteed to advance past the previous one
/// even when the clock does not tick between successive updates.
fn stamp_after(prev: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match prev {
        Some(p) if now <= p => p + Duration::microseconds(1),
        _ => now,
    }
}

impl MemoryStore {
    /// Create an empty store scoped to the given user.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a document verbatim, bypassing ownership and timestamp
    /// assignment. Used to set up fixtures.
    pub fn seed(&self, document: Document) {
        if let Ok(mut docs) = self.documents.write() {
            docs.insert(document.id.clone(), document);
        }
    }

    fn lock_err(e: impl std::fmt::Display) -> StoreError {
        StoreError::Internal(format!("Lock error: {}", e))
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Document>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(Self::lock_err)?;
            let mut owned: Vec<Document> = docs
                .values()
                .filter(|d| d.user_id == self.user_id)
                .cloned()
                .collect();
            owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(owned)
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, StoreResult<Option<Document>>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(Self::lock_err)?;
            Ok(docs
                .get(&id)
                .filter(|d| d.user_id == self.user_id)
                .cloned())
        })
    }

    fn create(&self, draft: DocumentDraft) -> BoxFuture<'_, StoreResult<Document>> {
        Box::pin(async move {
            let now = Utc::now();
            let doc = Document {
                id: Uuid::new_v4().to_string(),
                title: draft.title,
                content: draft.content,
                category: draft.category,
                category_color: draft.category_color,
                preview_image: draft.preview_image,
                created_at: Some(now),
                updated_at: Some(now),
                user_id: self.user_id.clone(),
            };

            let mut docs = self.documents.write().map_err(Self::lock_err)?;
            docs.insert(doc.id.clone(), doc.clone());
            Ok(doc)
        })
    }

    fn update(&self, id: &str, patch: DocumentPatch) -> BoxFuture<'_, StoreResult<Document>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(Self::lock_err)?;
            let doc = docs
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            if doc.user_id != self.user_id {
                return Err(StoreError::PermissionDenied(id));
            }

            if let Some(title) = patch.title {
                doc.title = title;
            }
            if let Some(content) = patch.content {
                doc.content = content;
            }
            if let Some(category) = patch.category {
                doc.category = Some(category);
            }
            if let Some(color) = patch.category_color {
                doc.category_color = Some(color);
            }
            if let Some(preview) = patch.preview_image {
                doc.preview_image = Some(preview);
            }
            doc.updated_at = Some(stamp_after(doc.updated_at));

            Ok(doc.clone())
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(Self::lock_err)?;
            let owned = match docs.get(&id) {
                None => return Err(StoreError::NotFound(id)),
                Some(d) => d.user_id == self.user_id,
            };
            if !owned {
                return Err(StoreError::PermissionDenied(id));
            }
            docs.remove(&id);
            Ok(())
        })
    }
}
