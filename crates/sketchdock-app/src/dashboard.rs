//! Document list view controller.

use crate::toast::ToastQueue;
use sketchdock_core::{Document, DocumentDraft, DocumentFilter, DocumentStore};

/// State behind the document list: the full set, loaded once, plus the
/// client-side filter applied on every keystroke.
pub struct Dashboard {
    documents: Vec<Document>,
    filter: DocumentFilter,
    loading: bool,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            filter: DocumentFilter::default(),
            loading: true,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the full document set. On failure the list stays empty and an
    /// error toast is queued.
    pub async fn load<S: DocumentStore>(&mut self, store: &S, toasts: &mut ToastQueue) {
        match store.list().await {
            Ok(docs) => {
                self.documents = docs;
            }
            Err(e) => {
                log::error!("Error fetching documents: {}", e);
                toasts.error("Failed to load your drawings");
            }
        }
        self.loading = false;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.filter.category = category;
    }

    pub fn filter(&self) -> &DocumentFilter {
        &self.filter
    }

    /// Documents passing the current filter, in store order
    /// (most-recently-updated first).
    pub fn visible(&self) -> Vec<&Document> {
        self.filter.apply(&self.documents)
    }

    /// Create a new untitled drawing and return its id for navigation to
    /// the editor. On failure queues an error toast and returns `None`.
    pub async fn create_document<S: DocumentStore>(
        &mut self,
        store: &S,
        category: Option<String>,
        toasts: &mut ToastQueue,
    ) -> Option<String> {
        match store.create(DocumentDraft::untitled(category)).await {
            Ok(doc) => {
                let id = doc.id.clone();
                // Newest document goes first, matching store order.
                self.documents.insert(0, doc);
                Some(id)
            }
            Err(e) => {
                log::error!("Error creating document: {}", e);
                toasts.error("Failed to create new drawing");
                None
            }
        }
    }

    /// Delete a drawing. Removal from the local list is sequenced strictly
    /// after remote success, so a failed delete leaves the list unchanged.
    pub async fn delete_document<S: DocumentStore>(
        &mut self,
        store: &S,
        id: &str,
        toasts: &mut ToastQueue,
    ) -> bool {
        match store.delete(id).await {
            Ok(()) => {
                self.documents.retain(|d| d.id != id);
                toasts.success("Drawing deleted successfully");
                true
            }
            Err(e) => {
                log::error!("Error deleting document: {}", e);
                toasts.error("Failed to delete drawing");
                false
            }
        }
    }
}
