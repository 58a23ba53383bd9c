//! Session Extractor
//!
//! [`SessionContext`] loads the browser's [`WebSession`] from the signed
//! session cookie, or starts a new one. Handlers mutate it and then either
//! [`commit`](SessionContext::commit) it, which persists changes and yields
//! the `Set-Cookie` header, or [`destroy`](SessionContext::destroy) it.
//!
//! A new session is only written to the store once it holds something.

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponseParts, ResponseParts};
use chrono::Utc;
use platform::cookie::extract_cookie;
use platform::crypto::{sign_token, verify_token};

use crate::application::config::UsersConfig;
use crate::domain::entity::web_session::WebSession;
use crate::domain::repository::{SessionRepository, UsersStore};
use crate::domain::value_object::SessionId;
use crate::error::{UsersError, UsersResult};
use crate::presentation::handlers::UsersAppState;

#[derive(Debug)]
pub struct SessionContext {
    session: WebSession,
    /// State as loaded from the store, `None` for a session not stored yet
    stored: Option<WebSession>,
}

impl SessionContext {
    pub fn fresh(config: &UsersConfig) -> Self {
        Self {
            session: WebSession::new(config.session_ttl),
            stored: None,
        }
    }

    pub fn loaded(session: WebSession) -> Self {
        Self {
            stored: Some(session.clone()),
            session,
        }
    }

    /// Session id carried by a signed cookie value
    fn session_id_from_cookie(config: &UsersConfig, token: &str) -> Option<SessionId> {
        verify_token(&config.session_secret, token)?.parse().ok()
    }

    /// Persist changes, returning the cookie to send back
    pub async fn commit<R>(mut self, repo: &R, config: &UsersConfig) -> UsersResult<SetSessionCookie>
    where
        R: SessionRepository,
    {
        let unchanged = match &self.stored {
            Some(stored) => *stored == self.session,
            None => self.session.is_blank(),
        };
        if unchanged {
            return Ok(SetSessionCookie(None));
        }

        self.session.touch(config.session_ttl);
        repo.save_session(&self.session).await?;

        // Login rotated the id; the pre-login row must not stay usable.
        if let Some(stored) = &self.stored {
            if stored.session_id != self.session.session_id {
                repo.delete_session(&stored.session_id).await?;
                tracing::debug!(
                    old_session_id = %stored.session_id,
                    session_id = %self.session.session_id,
                    "Session id rotated"
                );
            }
        }

        let token = sign_token(&config.session_secret, &self.session.session_id.to_string());
        Ok(SetSessionCookie(Some(
            config.cookie_config().build_set_cookie(&token),
        )))
    }

    /// Remove the session from the store and clear the cookie
    pub async fn destroy<R>(self, repo: &R, config: &UsersConfig) -> UsersResult<SetSessionCookie>
    where
        R: SessionRepository,
    {
        if self.stored.is_some() {
            repo.delete_session(&self.session.session_id).await?;
            tracing::debug!(session_id = %self.session.session_id, "Session destroyed");
        }
        Ok(SetSessionCookie(Some(
            config.cookie_config().build_delete_cookie(),
        )))
    }
}

impl Deref for SessionContext {
    type Target = WebSession;

    fn deref(&self) -> &WebSession {
        &self.session
    }
}

impl DerefMut for SessionContext {
    fn deref_mut(&mut self) -> &mut WebSession {
        &mut self.session
    }
}

impl<R> FromRequestParts<UsersAppState<R>> for SessionContext
where
    R: UsersStore,
{
    type Rejection = UsersError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &UsersAppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let config = &state.config;

        let session_id = extract_cookie(&parts.headers, &config.session_cookie_name)
            .and_then(|token| Self::session_id_from_cookie(config, &token));

        let Some(session_id) = session_id else {
            return Ok(Self::fresh(config));
        };

        let now_ms = Utc::now().timestamp_millis();
        match state.repo.find_session(&session_id).await? {
            Some(session) if !session.is_expired(now_ms) => Ok(Self::loaded(session)),
            _ => Ok(Self::fresh(config)),
        }
    }
}

/// `Set-Cookie` for the session, if anything needs to be sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetSessionCookie(pub Option<String>);

impl IntoResponseParts for SetSessionCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.0.and_then(|cookie| HeaderValue::from_str(&cookie).ok()) {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::UserId;
    use crate::infra::memory::MemoryUserStore;

    #[tokio::test]
    async fn test_blank_fresh_session_is_not_stored() {
        let store = MemoryUserStore::new();
        let config = UsersConfig::development();

        let cookie = SessionContext::fresh(&config)
            .commit(&store, &config)
            .await
            .unwrap();

        assert_eq!(cookie, SetSessionCookie(None));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn test_commit_signs_session_id() {
        let store = MemoryUserStore::new();
        let config = UsersConfig::development();

        let mut ctx = SessionContext::fresh(&config);
        ctx.log_in(UserId::new(), "alice");
        let session_id = ctx.session_id;

        let SetSessionCookie(Some(cookie)) = ctx.commit(&store, &config).await.unwrap() else {
            panic!("expected a cookie");
        };

        let token = cookie
            .strip_prefix("sid=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert_eq!(
            SessionContext::session_id_from_cookie(&config, token),
            Some(session_id)
        );
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_loaded_session_is_not_rewritten() {
        let store = MemoryUserStore::new();
        let config = UsersConfig::development();

        let mut session = WebSession::new(config.session_ttl);
        session.set_message("hello");

        let cookie = SessionContext::loaded(session)
            .commit(&store, &config)
            .await
            .unwrap();
        assert_eq!(cookie, SetSessionCookie(None));
    }

    #[tokio::test]
    async fn test_login_replaces_stored_session() {
        let store = MemoryUserStore::new();
        let config = UsersConfig::development();

        let mut anonymous = WebSession::new(config.session_ttl);
        anonymous.set_message("Username or Password is incorrect");
        store.save_session(&anonymous).await.unwrap();
        let old_id = anonymous.session_id;

        let mut ctx = SessionContext::loaded(anonymous);
        ctx.clear_message();
        ctx.log_in(UserId::new(), "alice");
        let new_id = ctx.session_id;
        ctx.commit(&store, &config).await.unwrap();

        assert_ne!(new_id, old_id);
        assert!(store.find_session(&old_id).await.unwrap().is_none());
        assert!(store.find_session(&new_id).await.unwrap().is_some());
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_forged_cookie_rejected() {
        let config = UsersConfig::development();
        let other = UsersConfig::development();
        let token = sign_token(&other.session_secret, &SessionId::new().to_string());

        assert_eq!(SessionContext::session_id_from_cookie(&config, &token), None);
        assert_eq!(SessionContext::session_id_from_cookie(&config, "garbage"), None);
    }
}
