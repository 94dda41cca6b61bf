//! Autosave coordination for an open document.
//!
//! Turns the editor's high-frequency change stream into a low-frequency
//! stream of persistence calls. Every change replaces the pending save with
//! a new one scheduled a debounce window later, so the save only fires once
//! edits go quiet. A manual save bypasses the countdown entirely.

use crate::document::{Document, DocumentPatch};
use crate::editor::{EditorHost, preview_data_uri};
use crate::store::{DocumentStore, StoreResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// A save waiting for the debounce window to elapse.
struct PendingSave {
    due_at: Instant,
    content: Value,
}

/// Coordinates persistence for one open document.
pub struct AutosaveCoordinator<S: DocumentStore> {
    store: Arc<S>,
    document_id: String,
    debounce: Duration,
    pending: Option<PendingSave>,
}

impl<S: DocumentStore> AutosaveCoordinator<S> {
    pub fn new(store: Arc<S>, document_id: impl Into<String>) -> Self {
        Self {
            store,
            document_id: document_id.into(),
            debounce: DEFAULT_DEBOUNCE,
            pending: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Record a content change. Any pending save is replaced by a new one
    /// due a full debounce window from `now`, so at most one save is ever
    /// scheduled.
    pub fn record_change(&mut self, content: Value, now: Instant) {
        self.pending = Some(PendingSave {
            due_at: now + self.debounce,
            content,
        });
    }

    /// Whether a save is scheduled.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the scheduled save is due, if any.
    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due_at)
    }

    /// Fire the pending save if its window has elapsed.
    ///
    /// Returns the updated document when a save ran, `None` when nothing
    /// was due. A failed save is not retried; the next edit reschedules.
    pub async fn tick(
        &mut self,
        now: Instant,
        editor: &dyn EditorHost,
    ) -> StoreResult<Option<Document>> {
        let Some(pending) = self.pending.take_if(|p| now >= p.due_at) else {
            return Ok(None);
        };

        let doc = self.persist(pending.content, editor).await?;
        Ok(Some(doc))
    }

    /// Manual save: cancels any pending countdown and persists `content`
    /// immediately.
    pub async fn save_now(
        &mut self,
        content: Value,
        editor: &dyn EditorHost,
    ) -> StoreResult<Document> {
        self.pending = None;
        self.persist(content, editor).await
    }

    async fn persist(&self, content: Value, editor: &dyn EditorHost) -> StoreResult<Document> {
        let preview = capture_preview(editor);
        let patch = DocumentPatch::content(content, preview);
        let doc = self.store.update(&self.document_id, patch).await?;
        log::debug!("Persisted document {}", self.document_id);
        Ok(doc)
    }
}

/// Ask the editor for a rasterized snapshot. Failure downgrades silently:
/// the save proceeds with the preview field omitted.
fn capture_preview(editor: &dyn EditorHost) -> Option<String> {
    match editor.export_preview() {
        Ok(bytes) if !bytes.is_empty() => Some(preview_data_uri(&bytes)),
        Ok(_) => {
            log::warn!("Preview export produced no image, keeping stored preview");
            None
        }
        Err(e) => {
            log::warn!("Preview export failed ({}), keeping stored preview", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentDraft;
    use crate::editor::PreviewError;
    use crate::store::MemoryStore;
    use crate::test_util::block_on;
    use serde_json::json;

    /// Editor stand-in with a scripted preview result.
    struct FakeEditor(Result<Vec<u8>, ()>);

    impl EditorHost for FakeEditor {
        fn export_preview(&self) -> Result<Vec<u8>, PreviewError> {
            match &self.0 {
                Ok(bytes) => Ok(bytes.clone()),
                Err(()) => Err(PreviewError::Export("canvas gone".to_string())),
            }
        }
    }

    fn setup() -> (Arc<MemoryStore>, Document) {
        let store = Arc::new(MemoryStore::new("user-1"));
        let doc = block_on(store.create(DocumentDraft::untitled(None))).unwrap();
        (store, doc)
    }

    #[test]
    fn test_burst_of_edits_fires_exactly_one_save_with_latest_content() {
        let (store, doc) = setup();
        let mut autosave = AutosaveCoordinator::new(store.clone(), &doc.id)
            .with_debounce(Duration::from_secs(3));
        let editor = FakeEditor(Ok(vec![1, 2, 3]));
        let t0 = Instant::now();

        autosave.record_change(json!({"rev": 1}), t0);
        autosave.record_change(json!({"rev": 2}), t0 + Duration::from_secs(1));

        // The second edit restarted the countdown, so nothing is due a full
        // window after the first edit.
        let fired = block_on(autosave.tick(t0 + Duration::from_secs(3), &editor)).unwrap();
        assert!(fired.is_none());
        assert!(autosave.has_pending());

        // One window after the last edit, exactly one save fires, carrying
        // the latest snapshot.
        let saved = block_on(autosave.tick(t0 + Duration::from_secs(4), &editor))
            .unwrap()
            .expect("save should fire");
        assert_eq!(saved.content, json!({"rev": 2}));
        assert!(!autosave.has_pending());

        // And no second save.
        let again = block_on(autosave.tick(t0 + Duration::from_secs(10), &editor)).unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn test_manual_save_cancels_pending_countdown() {
        let (store, doc) = setup();
        let mut autosave = AutosaveCoordinator::new(store.clone(), &doc.id)
            .with_debounce(Duration::from_secs(3));
        let editor = FakeEditor(Ok(vec![1]));
        let t0 = Instant::now();

        autosave.record_change(json!({"rev": 1}), t0);
        let saved =
            block_on(autosave.save_now(json!({"rev": "manual"}), &editor)).unwrap();
        assert_eq!(saved.content, json!({"rev": "manual"}));
        assert!(!autosave.has_pending());

        // The cancelled countdown never fires.
        let fired = block_on(autosave.tick(t0 + Duration::from_secs(60), &editor)).unwrap();
        assert!(fired.is_none());
        let stored = block_on(store.get(&doc.id)).unwrap().unwrap();
        assert_eq!(stored.content, json!({"rev": "manual"}));
    }

    #[test]
    fn test_save_updates_preview_from_editor_export() {
        let (store, doc) = setup();
        let mut autosave = AutosaveCoordinator::new(store.clone(), &doc.id);
        let editor = FakeEditor(Ok(vec![0x89, 0x50]));

        let saved = block_on(autosave.save_now(json!({}), &editor)).unwrap();
        let preview = saved.preview_image.expect("preview should be stored");
        assert!(preview.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_failed_preview_keeps_stored_preview_and_save_succeeds() {
        let (store, doc) = setup();
        block_on(store.update(
            &doc.id,
            DocumentPatch {
                preview_image: Some("data:image/png;base64,OLD".to_string()),
                ..DocumentPatch::default()
            },
        ))
        .unwrap();

        let mut autosave = AutosaveCoordinator::new(store.clone(), &doc.id);
        let editor = FakeEditor(Err(()));

        let saved = block_on(autosave.save_now(json!({"rev": 2}), &editor)).unwrap();
        assert_eq!(saved.content, json!({"rev": 2}));
        assert_eq!(
            saved.preview_image.as_deref(),
            Some("data:image/png;base64,OLD")
        );
    }

    #[test]
    fn test_empty_preview_export_is_treated_as_missing() {
        let (store, doc) = setup();
        let mut autosave = AutosaveCoordinator::new(store.clone(), &doc.id);
        let editor = FakeEditor(Ok(vec![]));

        let saved = block_on(autosave.save_now(json!({}), &editor)).unwrap();
        assert!(saved.preview_image.is_none());
    }
}
