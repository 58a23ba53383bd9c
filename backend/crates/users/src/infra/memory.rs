//! In-Memory Repository
//!
//! Implements every repository trait over hash maps, enforcing the same
//! unique constraints as the `users` table. Used by the handler tests and
//! handy for running the service without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::entity::{post::Post, user::User, web_session::WebSession};
use crate::domain::repository::{PostRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{PostId, SessionId, UserId};
use crate::error::{UniqueField, UsersError, UsersResult};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    posts: HashMap<PostId, Post>,
    sessions: HashMap<SessionId, WebSession>,
}

impl MemoryState {
    /// First unique field of `user` already used by a different account
    fn conflict(&self, user: &User) -> Option<UniqueField> {
        let others = || self.users.values().filter(move |u| u.user_id != user.user_id);

        if others().any(|u| u.name == user.name) {
            return Some(UniqueField::Name);
        }
        if others().any(|u| u.email == user.email) {
            return Some(UniqueField::Email);
        }
        if user.phone.is_some() && others().any(|u| u.phone == user.phone) {
            return Some(UniqueField::Phone);
        }
        if user.linkedin.is_some() && others().any(|u| u.linkedin == user.linkedin) {
            return Some(UniqueField::Linkedin);
        }
        if user.provider_subject.is_some()
            && others().any(|u| u.provider_subject == user.provider_subject)
        {
            return Some(UniqueField::ProviderSubject);
        }
        None
    }

    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.values().find(|u| pred(u)).cloned()
    }
}

/// Thread-safe in-memory store
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> UsersResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| UsersError::Internal("memory store lock poisoned".to_string()))
    }

    /// Store a post and append it to its owner's post list
    pub fn insert_post(&self, post: Post) -> UsersResult<()> {
        let mut state = self.lock()?;
        let owner = state
            .users
            .get_mut(&post.owner_id)
            .ok_or(UsersError::UserNotFound)?;
        owner.post_ids.push(post.post_id);
        state.posts.insert(post.post_id, post);
        Ok(())
    }

    pub fn post_count(&self) -> usize {
        self.lock().map(|state| state.posts.len()).unwrap_or(0)
    }

    pub fn session_count(&self) -> usize {
        self.lock().map(|state| state.sessions.len()).unwrap_or(0)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for MemoryUserStore {
    async fn create(&self, user: &User) -> UsersResult<()> {
        let mut state = self.lock()?;
        if let Some(field) = state.conflict(user) {
            return Err(UsersError::Taken(field));
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> UsersResult<Option<User>> {
        Ok(self.lock()?.users.get(user_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> UsersResult<Option<User>> {
        Ok(self.lock()?.find_user(|u| u.name.as_str() == name))
    }

    async fn find_by_email(&self, email: &str) -> UsersResult<Option<User>> {
        Ok(self.lock()?.find_user(|u| u.email.as_str() == email))
    }

    async fn find_by_phone(&self, phone: &str) -> UsersResult<Option<User>> {
        Ok(self.lock()?.find_user(|u| u.phone.as_deref() == Some(phone)))
    }

    async fn find_by_linkedin(&self, linkedin: &str) -> UsersResult<Option<User>> {
        Ok(self.lock()?.find_user(|u| u.linkedin.as_deref() == Some(linkedin)))
    }

    async fn find_by_provider_subject(&self, subject: &str) -> UsersResult<Option<User>> {
        Ok(self
            .lock()?
            .find_user(|u| u.provider_subject.as_deref() == Some(subject)))
    }

    async fn update(&self, user: &User) -> UsersResult<()> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&user.user_id) {
            return Err(UsersError::UserNotFound);
        }
        if let Some(field) = state.conflict(user) {
            return Err(UsersError::Taken(field));
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn delete_by_id(&self, user_id: &UserId) -> UsersResult<Option<User>> {
        Ok(self.lock()?.users.remove(user_id))
    }
}

// ============================================================================
// Post Repository Implementation
// ============================================================================

impl PostRepository for MemoryUserStore {
    async fn find_by_ids(&self, post_ids: &[PostId]) -> UsersResult<Vec<Post>> {
        let state = self.lock()?;
        Ok(post_ids
            .iter()
            .filter_map(|id| state.posts.get(id).cloned())
            .collect())
    }

    async fn delete_many(&self, post_ids: &[PostId]) -> UsersResult<u64> {
        let mut state = self.lock()?;
        let deleted = post_ids
            .iter()
            .filter(|id| state.posts.remove(*id).is_some())
            .count();
        Ok(deleted as u64)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for MemoryUserStore {
    async fn find_session(&self, session_id: &SessionId) -> UsersResult<Option<WebSession>> {
        let now_ms = Utc::now().timestamp_millis();
        Ok(self
            .lock()?
            .sessions
            .get(session_id)
            .filter(|s| !s.is_expired(now_ms))
            .cloned())
    }

    async fn save_session(&self, session: &WebSession) -> UsersResult<()> {
        self.lock()?
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn delete_session(&self, session_id: &SessionId) -> UsersResult<()> {
        self.lock()?.sessions.remove(session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> UsersResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut state = self.lock()?;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired(now_ms));
        Ok((before - state.sessions.len()) as u64)
    }
}
