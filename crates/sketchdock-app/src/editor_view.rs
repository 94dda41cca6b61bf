//! Editor session state machine.
//!
//! `Loading` while the initial fetch is in flight, `Ready` once the
//! document is available for the embedded editor. Saving never blocks the
//! session; only the save-button affordance reflects it. A failed load
//! requests a redirect back to the dashboard.

use crate::toast::ToastQueue;
use sketchdock_core::{
    AutosaveCoordinator, Document, DocumentPatch, DocumentStore, EditorHost, SceneUpdate,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Initial fetch in flight; editor not rendered.
    Loading,
    /// Document available; edits flow through the autosave coordinator.
    Ready,
    /// Load failed; the caller should navigate back to the dashboard.
    Redirect,
}

/// One open editing session for a single document.
pub struct EditorView<S: DocumentStore> {
    store: Arc<S>,
    document_id: String,
    state: ViewState,
    document: Option<Document>,
    title: String,
    loaded_title: String,
    current_content: Value,
    saving: bool,
    autosave: AutosaveCoordinator<S>,
}

impl<S: DocumentStore> EditorView<S> {
    pub fn new(store: Arc<S>, document_id: impl Into<String>, debounce: Duration) -> Self {
        let document_id = document_id.into();
        let autosave =
            AutosaveCoordinator::new(store.clone(), document_id.clone()).with_debounce(debounce);
        Self {
            store,
            document_id,
            state: ViewState::Loading,
            document: None,
            title: String::new(),
            loaded_title: String::new(),
            current_content: Value::Object(Default::default()),
            saving: false,
            autosave,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether a manual save is in flight (non-blocking affordance only).
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Fetch the document and transition to `Ready`, or to `Redirect` when
    /// it cannot be loaded.
    pub async fn load(&mut self, toasts: &mut ToastQueue) {
        match self.store.get(&self.document_id).await {
            Ok(Some(doc)) => {
                self.title = doc.title.clone();
                self.loaded_title = doc.title.clone();
                self.current_content = doc.content.clone();
                self.document = Some(doc);
                self.state = ViewState::Ready;
            }
            Ok(None) => {
                log::error!("Document {} not found", self.document_id);
                toasts.error("Failed to load drawing");
                self.state = ViewState::Redirect;
            }
            Err(e) => {
                log::error!("Error fetching document {}: {}", self.document_id, e);
                toasts.error("Failed to load drawing");
                self.state = ViewState::Redirect;
            }
        }
    }

    /// Initial payload for the embedded editor.
    pub fn initial_scene(&self) -> Option<SceneUpdate> {
        self.document
            .as_ref()
            .map(|doc| SceneUpdate::from_content(&doc.content))
    }

    /// Route an editor change event into the autosave countdown.
    pub fn on_scene_change(&mut self, update: SceneUpdate, now: Instant) {
        if self.state != ViewState::Ready {
            return;
        }
        self.current_content = update.into_content();
        self.autosave.record_change(self.current_content.clone(), now);
    }

    /// Drive the autosave countdown. Call periodically with the current
    /// time; fires at most one persist per elapsed window.
    pub async fn tick(&mut self, now: Instant, editor: &dyn EditorHost, toasts: &mut ToastQueue) {
        match self.autosave.tick(now, editor).await {
            Ok(Some(doc)) => {
                self.document = Some(doc);
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Error saving drawing: {}", e);
                toasts.error("Failed to save drawing");
            }
        }
    }

    /// Manual save: persists the content as of now, cancelling any pending
    /// autosave countdown.
    pub async fn save(&mut self, editor: &dyn EditorHost, toasts: &mut ToastQueue) -> bool {
        if self.state != ViewState::Ready {
            return false;
        }

        self.saving = true;
        let result = self
            .autosave
            .save_now(self.current_content.clone(), editor)
            .await;
        self.saving = false;

        match result {
            Ok(doc) => {
                self.document = Some(doc);
                toasts.success("Drawing saved successfully");
                true
            }
            Err(e) => {
                log::error!("Error saving drawing: {}", e);
                toasts.error("Failed to save drawing");
                false
            }
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Persist the title on focus loss, but only when it actually changed
    /// since load.
    pub async fn commit_title(&mut self, toasts: &mut ToastQueue) {
        if self.state != ViewState::Ready || self.title == self.loaded_title {
            return;
        }

        match self
            .store
            .update(&self.document_id, DocumentPatch::title(self.title.clone()))
            .await
        {
            Ok(doc) => {
                self.loaded_title = doc.title.clone();
                self.document = Some(doc);
            }
            Err(e) => {
                log::error!("Error updating title: {}", e);
                toasts.error("Failed to update title");
            }
        }
    }

    /// Whether an autosave is scheduled but not yet fired.
    pub fn has_pending_autosave(&self) -> bool {
        self.autosave.has_pending()
    }
}
