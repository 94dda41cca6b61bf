//! Hosted row-store backend.
//!
//! Speaks the PostgREST-style REST dialect of the hosted backend: one
//! `documents` table, filtered and ordered through query parameters, with
//! row-level security scoping every operation to the owning user.

use super::{BoxFuture, DocumentStore, StoreError, StoreResult};
use crate::auth::AuthState;
use crate::document::{Document, DocumentDraft, DocumentPatch};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const TABLE_PATH: &str = "/rest/v1/documents";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the hosted `documents` table.
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    auth: Arc<AuthState>,
}

impl RemoteStore {
    /// Create a store against the given backend project.
    ///
    /// `base_url` is the project root (no trailing slash needed);
    /// `api_key` is the public anon key sent with every request.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        auth: Arc<AuthState>,
    ) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            auth,
        })
    }

    fn table_url(&self) -> String {
        format!("{}{}", self.base_url, TABLE_PATH)
    }

    /// Bearer token for the current request: the session's access token
    /// when signed in, the anon key otherwise.
    fn bearer(&self) -> String {
        self.auth
            .session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.api_key.clone())
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .header("Content-Type", "application/json")
    }

    async fn send(builder: reqwest::RequestBuilder) -> StoreResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| backend_message(&body))
            .unwrap_or_else(|| status.to_string());

        match status.as_u16() {
            401 | 403 => Err(StoreError::PermissionDenied(message)),
            code => Err(StoreError::Backend {
                status: code,
                message,
            }),
        }
    }

    async fn rows(builder: reqwest::RequestBuilder) -> StoreResult<Vec<Document>> {
        let response = Self::send(builder).await?;
        response
            .json::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Pull the error message out of a backend error body, if it has one.
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

/// Insert payload: the caller's draft plus the owning user id.
fn insert_payload(draft: &DocumentDraft, user_id: &str) -> StoreResult<Value> {
    let mut value =
        serde_json::to_value(draft).map_err(|e| StoreError::Serialization(e.to_string()))?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("user_id".to_string(), Value::String(user_id.to_string()));
    }
    Ok(value)
}

impl DocumentStore for RemoteStore {
    fn list(&self) -> BoxFuture<'_, StoreResult<Vec<Document>>> {
        Box::pin(async move {
            let url = format!("{}?select=*&order=updated_at.desc", self.table_url());
            Self::rows(self.request(reqwest::Method::GET, &url)).await
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, StoreResult<Option<Document>>> {
        let id = id.to_string();
        Box::pin(async move {
            let url = format!("{}?select=*&id=eq.{}&limit=1", self.table_url(), id);
            let mut rows = Self::rows(self.request(reqwest::Method::GET, &url)).await?;
            Ok(rows.pop())
        })
    }

    fn create(&self, draft: DocumentDraft) -> BoxFuture<'_, StoreResult<Document>> {
        Box::pin(async move {
            let session = self
                .auth
                .session()
                .ok_or_else(|| StoreError::PermissionDenied("No active session".to_string()))?;

            let payload = insert_payload(&draft, &session.user.id)?;
            let builder = self
                .request(reqwest::Method::POST, &self.table_url())
                .header("Prefer", "return=representation")
                .json(&payload);

            let mut rows = Self::rows(builder).await?;
            rows.pop().ok_or_else(|| StoreError::Backend {
                status: 200,
                message: "Insert returned no row".to_string(),
            })
        })
    }

    fn update(&self, id: &str, patch: DocumentPatch) -> BoxFuture<'_, StoreResult<Document>> {
        let id = id.to_string();
        let mut patch = patch;
        Box::pin(async move {
            patch.updated_at = Some(Utc::now());

            let url = format!("{}?id=eq.{}", self.table_url(), id);
            let builder = self
                .request(reqwest::Method::PATCH, &url)
                .header("Prefer", "return=representation")
                .json(&patch);

            let mut rows = Self::rows(builder).await?;
            // Row-level security makes a foreign row look absent: zero rows
            // come back for missing and not-owned ids alike.
            rows.pop().ok_or(StoreError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let url = format!("{}?id=eq.{}", self.table_url(), id);
            let builder = self
                .request(reqwest::Method::DELETE, &url)
                .header("Prefer", "return=representation");

            let rows = Self::rows(builder).await?;
            if rows.is_empty() {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_payload_injects_owner() {
        let draft = DocumentDraft::untitled(Some("diagrams".to_string()));
        let payload = insert_payload(&draft, "user-9").unwrap();

        assert_eq!(payload["user_id"], json!("user-9"));
        assert_eq!(payload["category"], json!("diagrams"));
        assert_eq!(payload["title"], json!(crate::document::DEFAULT_TITLE));
        // Unset optional fields stay off the wire.
        assert!(payload.get("preview_image").is_none());
    }

    #[test]
    fn test_backend_message_extraction() {
        let body = r#"{"message": "permission denied for table documents"}"#;
        assert_eq!(
            backend_message(body).as_deref(),
            Some("permission denied for table documents")
        );
        assert!(backend_message("not json").is_none());
        assert!(backend_message(r#"{"hint": null}"#).is_none());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let auth = Arc::new(AuthState::new());
        let store = RemoteStore::new("https://example.test/", "anon", auth).unwrap();
        assert_eq!(store.table_url(), "https://example.test/rest/v1/documents");
    }
}
