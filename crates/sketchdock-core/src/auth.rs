//! Authentication client and session state.
//!
//! Sign-in identifiers are usernames; the hosted auth service only accepts
//! email-shaped identifiers, so a fixed domain suffix is appended before
//! any request (as the original workspace did).
//!
//! Session state is process-wide and listener-driven: interested parties
//! subscribe and receive a change notification whenever a session is
//! installed or cleared. Each subscription is an owned object with a cancel
//! handle; dropping it unsubscribes.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use thiserror::Error;

/// Domain suffix appended to usernames to form the login identifier.
pub const EMAIL_DOMAIN: &str = "example.com";

const SIGNUP_PATH: &str = "/auth/v1/signup";
const TOKEN_PATH: &str = "/auth/v1/token?grant_type=password";
const LOGOUT_PATH: &str = "/auth/v1/logout";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Login identifier for a username.
pub fn login_email(username: &str) -> String {
    format!("{}@{}", username, EMAIL_DOMAIN)
}

/// Auth errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Auth rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Auth error: {0}")]
    Internal(String),
}

/// The authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An active session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Session change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

type Listener = Arc<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct AuthStateInner {
    session: Option<Session>,
    listeners: HashMap<u64, Listener>,
}

/// Process-wide session state.
#[derive(Default)]
pub struct AuthState {
    inner: Mutex<AuthStateInner>,
    next_listener_id: AtomicU64,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current session, if signed in.
    pub fn session(&self) -> Option<Session> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.session.clone())
    }

    /// Install or clear the session and notify all subscribers.
    pub fn set_session(&self, session: Option<Session>) {
        let (event, listeners, session) = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            inner.session = session;
            let event = if inner.session.is_some() {
                AuthEvent::SignedIn
            } else {
                AuthEvent::SignedOut
            };
            let listeners: Vec<Listener> = inner.listeners.values().cloned().collect();
            (event, listeners, inner.session.clone())
        };

        // Listeners run outside the lock so they may query state freely.
        for listener in listeners {
            (*listener)(event, session.as_ref());
        }
    }

    /// Register a session change listener.
    ///
    /// The returned subscription keeps the listener alive; cancel it (or
    /// drop it) to stop receiving notifications.
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(AuthEvent, Option<&Session>) + Send + Sync + 'static,
    ) -> AuthSubscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.insert(id, Arc::new(listener));
        }
        AuthSubscription {
            id,
            state: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: u64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.remove(&id);
        }
    }
}

/// Owned handle for a session change subscription.
pub struct AuthSubscription {
    id: u64,
    state: Weak<AuthState>,
}

impl AuthSubscription {
    /// Stop receiving notifications.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.unsubscribe(self.id);
        }
    }
}

/// Client for the hosted auth service.
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    state: Arc<AuthState>,
}

impl AuthClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        state: Arc<AuthState>,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            state,
        })
    }

    /// Shared session state.
    pub fn state(&self) -> &Arc<AuthState> {
        &self.state
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .header("Content-Type", "application/json")
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| error_description(&body))
            .unwrap_or_else(|| status.to_string());
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// Register a new account. Does not sign in.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let payload = serde_json::json!({
            "email": login_email(username),
            "password": password,
            "data": { "username": username },
        });

        let response = self
            .post(SIGNUP_PATH)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        Self::check(response).await?;

        log::info!("Signed up user {}", username);
        Ok(())
    }

    /// Sign in with the password grant, install the session and notify
    /// subscribers.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let payload = serde_json::json!({
            "email": login_email(username),
            "password": password,
        });

        let response = self
            .post(TOKEN_PATH)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let response = Self::check(response).await?;

        let session: Session = response
            .json()
            .await
            .map_err(|e| AuthError::Serialization(e.to_string()))?;

        log::info!("Signed in as {}", session.user.id);
        self.state.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Sign out, clear the session and notify subscribers.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.state.session().ok_or(AuthError::NotSignedIn)?;

        let response = self
            .post(LOGOUT_PATH)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        Self::check(response).await?;

        self.state.set_session(None);
        log::info!("Signed out");
        Ok(())
    }
}

/// Pull a human-readable message out of an auth error body.
fn error_description(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["error_description", "msg", "message"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn session(user_id: &str) -> Session {
        Session {
            access_token: "token".to_string(),
            user: User {
                id: user_id.to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn test_login_email_appends_fixed_domain() {
        assert_eq!(login_email("ada"), "ada@example.com");
    }

    #[test]
    fn test_subscribers_see_session_changes() {
        let state = Arc::new(AuthState::new());
        let events = Arc::new(Mutex::new(Vec::new()));

        let seen = events.clone();
        let _sub = state.subscribe(move |event, session| {
            seen.lock()
                .unwrap()
                .push((event, session.map(|s| s.user.id.clone())));
        });

        state.set_session(Some(session("u1")));
        state.set_session(None);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (AuthEvent::SignedIn, Some("u1".to_string())));
        assert_eq!(events[1], (AuthEvent::SignedOut, None));
    }

    #[test]
    fn test_cancelled_subscription_stops_notifications() {
        let state = Arc::new(AuthState::new());
        let count = Arc::new(AtomicUsize::new(0));

        let seen = count.clone();
        let sub = state.subscribe(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        state.set_session(Some(session("u1")));
        sub.cancel();
        state.set_session(None);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_subscription_unsubscribes() {
        let state = Arc::new(AuthState::new());
        let count = Arc::new(AtomicUsize::new(0));

        {
            let seen = count.clone();
            let _sub = state.subscribe(move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        state.set_session(Some(session("u1")));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_error_description_fallbacks() {
        assert_eq!(
            error_description(r#"{"error_description": "Invalid login credentials"}"#).as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(
            error_description(r#"{"msg": "User already registered"}"#).as_deref(),
            Some("User already registered")
        );
        assert!(error_description("oops").is_none());
    }
}
