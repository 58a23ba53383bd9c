//! Web Session Entity
//!
//! Server-side state of one browser: who is logged in, the pending flash
//! message and the in-flight provider sign-in (CSRF state + PKCE verifier).

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::value_object::{SessionId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct WebSession {
    pub session_id: SessionId,
    /// Authenticated account, `None` when logged out
    pub user_id: Option<UserId>,
    /// Display name of the authenticated account
    pub name: Option<String>,
    /// One-shot flash message
    pub message: Option<String>,
    pub oauth_state: Option<String>,
    pub pkce_verifier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at_ms: i64,
}

impl WebSession {
    pub fn new(ttl: Duration) -> Self {
        let now = super::user::now();

        Self {
            session_id: SessionId::new(),
            user_id: None,
            name: None,
            message: None,
            oauth_state: None,
            pkce_verifier: None,
            created_at: now,
            last_activity_at: now,
            expires_at_ms: now.timestamp_millis() + ttl.as_millis() as i64,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether `user_id` is the account this session is logged in as
    pub fn is_user(&self, user_id: &UserId) -> bool {
        self.user_id.as_ref() == Some(user_id)
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms <= now_ms
    }

    /// Holds nothing worth persisting
    pub fn is_blank(&self) -> bool {
        self.user_id.is_none()
            && self.message.is_none()
            && self.oauth_state.is_none()
            && self.pkce_verifier.is_none()
    }

    /// Authenticate the session under a new id
    ///
    /// An id handed out before login never identifies the logged-in session.
    pub fn log_in(&mut self, user_id: UserId, name: impl Into<String>) {
        self.session_id = SessionId::new();
        self.user_id = Some(user_id);
        self.name = Some(name.into());
    }

    pub fn log_out(&mut self) {
        self.user_id = None;
        self.name = None;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Read the flash message and clear it
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn begin_provider_sign_in(&mut self, state: String, pkce_verifier: String) {
        self.oauth_state = Some(state);
        self.pkce_verifier = Some(pkce_verifier);
    }

    /// Remove the pending provider sign-in, returning `(state, pkce_verifier)`
    pub fn take_provider_sign_in(&mut self) -> Option<(String, String)> {
        let state = self.oauth_state.take();
        let verifier = self.pkce_verifier.take();
        state.zip(verifier)
    }

    /// Record activity and slide the expiry forward
    pub fn touch(&mut self, ttl: Duration) {
        let now = super::user::now();
        self.last_activity_at = now;
        self.expires_at_ms = now.timestamp_millis() + ttl.as_millis() as i64;
    }
}
