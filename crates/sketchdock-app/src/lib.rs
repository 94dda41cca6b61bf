//! SketchDock Application
//!
//! View controllers for the document list and the editing session, plus
//! the configuration and notification plumbing shared with the CLI entry
//! point.

pub mod config;
pub mod dashboard;
pub mod editor_view;
pub mod toast;

pub use config::{AppConfig, ConfigError};
pub use dashboard::Dashboard;
pub use editor_view::{EditorView, ViewState};
pub use toast::{Toast, ToastLevel, ToastQueue};
