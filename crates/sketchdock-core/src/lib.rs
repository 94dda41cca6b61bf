//! SketchDock Core Library
//!
//! Document model, persistence backends, autosave coordination and session
//! plumbing for the SketchDock drawing workspace. The drawing editor itself
//! is an external collaborator reached through the [`editor`] seam.

pub mod auth;
pub mod autosave;
pub mod document;
pub mod editor;
pub mod filter;
pub mod store;

pub use auth::{AuthClient, AuthError, AuthEvent, AuthState, AuthSubscription, Session, User};
pub use autosave::{AutosaveCoordinator, DEFAULT_DEBOUNCE};
pub use document::{DEFAULT_TITLE, Document, DocumentDraft, DocumentPatch};
pub use editor::{EditorHost, PreviewError, SceneUpdate};
pub use filter::DocumentFilter;
pub use store::{DocumentStore, MemoryStore, RemoteStore, StoreError, StoreResult};
