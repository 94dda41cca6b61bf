//! Seam to the embedded drawing editor.
//!
//! The editor itself (rendering, hit-testing, tools) lives outside this
//! crate. It reports edits as [`SceneUpdate`]s and can be asked for a
//! rasterized snapshot of the current scene.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use thiserror::Error;

/// Preview export errors.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Preview export failed: {0}")]
    Export(String),
    #[error("Preview export produced no image")]
    Empty,
}

/// Handle to the embedded editor instance.
pub trait EditorHost {
    /// Rasterize the current scene to PNG bytes.
    fn export_preview(&self) -> Result<Vec<u8>, PreviewError>;
}

/// Payload of the editor's change callback: the drawing elements plus the
/// view state, both opaque to this crate.
#[derive(Debug, Clone, Default)]
pub struct SceneUpdate {
    pub elements: Value,
    pub view_state: Value,
}

impl SceneUpdate {
    pub fn new(elements: Value, view_state: Value) -> Self {
        Self {
            elements,
            view_state,
        }
    }

    /// Pack into the persisted content blob shape.
    pub fn into_content(self) -> Value {
        json!({
            "elements": self.elements,
            "appState": self.view_state,
        })
    }

    /// Unpack a persisted content blob into editor initial data.
    /// Unknown or missing pieces fall back to an empty scene.
    pub fn from_content(content: &Value) -> Self {
        Self {
            elements: content.get("elements").cloned().unwrap_or(json!([])),
            view_state: content.get("appState").cloned().unwrap_or(json!({})),
        }
    }
}

/// Encode PNG bytes as the data URI stored in `preview_image`.
pub fn preview_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}
