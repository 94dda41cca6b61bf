//! Document records and partial-update payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title given to documents created without an explicit name.
pub const DEFAULT_TITLE: &str = "Untitled Drawing";

/// A persisted drawing document.
///
/// `content` is an opaque blob owned by the embedded editor (drawing
/// elements plus view state). This crate stores and returns it verbatim
/// and never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier, assigned by the store at creation.
    pub id: String,
    /// Document title.
    pub title: String,
    /// Opaque editor content.
    #[serde(default)]
    pub content: Value,
    /// Optional category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional category accent color.
    #[serde(default)]
    pub category_color: Option<String>,
    /// Optional data-URI-encoded raster preview.
    #[serde(default)]
    pub preview_image: Option<String>,
    /// Creation timestamp, assigned by the store.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-modification timestamp, refreshed by the store on every mutation.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning user, set from the authenticated session at creation.
    pub user_id: String,
}

/// Fields supplied by the caller when creating a document.
///
/// The store fills in `id`, `user_id` and timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDraft {
    pub title: String,
    pub content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
}

impl Default for DocumentDraft {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            content: Value::Object(Default::default()),
            category: None,
            category_color: None,
            preview_image: None,
        }
    }
}

impl DocumentDraft {
    /// Draft with the default title, empty content and an optional category.
    pub fn untitled(category: Option<String>) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }
}

/// Partial update payload.
///
/// Fields left as `None` are omitted from the serialized payload and the
/// store leaves them unchanged. In particular a failed preview capture is
/// expressed by omitting `preview_image`, not by clearing it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
    /// Stamped by the store, never by callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentPatch {
    /// Patch that only renames the document.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Patch carrying new editor content and an optional preview snapshot.
    pub fn content(content: Value, preview_image: Option<String>) -> Self {
        Self {
            content: Some(content),
            preview_image,
            ..Self::default()
        }
    }

    /// True when no caller-visible field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.category_color.is_none()
            && self.preview_image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_omits_unset_fields() {
        let patch = DocumentPatch::title("Renamed");
        let wire = serde_json::to_value(&patch).unwrap();

        let obj = wire.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["title"], json!("Renamed"));
    }

    #[test]
    fn test_content_patch_omits_failed_preview() {
        let patch = DocumentPatch::content(json!({"elements": []}), None);
        let wire = serde_json::to_value(&patch).unwrap();

        assert!(wire.get("preview_image").is_none());
        assert!(wire.get("content").is_some());
    }

    #[test]
    fn test_untitled_draft_has_no_category_by_default() {
        let draft = DocumentDraft::untitled(None);
        assert_eq!(draft.title, DEFAULT_TITLE);
        assert!(draft.category.is_none());

        let wire = serde_json::to_value(&draft).unwrap();
        assert!(wire.get("category").is_none());
    }

    #[test]
    fn test_document_roundtrip_keeps_content_verbatim() {
        let content = json!({
            "elements": [{"type": "freedraw", "points": [[0, 0], [3, 4]]}],
            "appState": {"zoom": 1.5}
        });
        let doc = Document {
            id: "d1".to_string(),
            title: "Sketch".to_string(),
            content: content.clone(),
            category: None,
            category_color: None,
            preview_image: None,
            created_at: None,
            updated_at: None,
            user_id: "u1".to_string(),
        };

        let wire = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.content, content);
    }
}
