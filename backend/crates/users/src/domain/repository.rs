//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer (PostgreSQL and in-memory).

use crate::domain::entity::{post::Post, user::User, web_session::WebSession};
use crate::domain::value_object::{PostId, SessionId, UserId};
use crate::error::UsersResult;

/// User account repository
///
/// Writes report unique-index violations as `UsersError::Taken`.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create(&self, user: &User) -> UsersResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> UsersResult<Option<User>>;

    async fn find_by_name(&self, name: &str) -> UsersResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> UsersResult<Option<User>>;

    async fn find_by_phone(&self, phone: &str) -> UsersResult<Option<User>>;

    async fn find_by_linkedin(&self, linkedin: &str) -> UsersResult<Option<User>>;

    async fn find_by_provider_subject(&self, subject: &str) -> UsersResult<Option<User>>;

    /// Overwrite the stored account with `user`
    async fn update(&self, user: &User) -> UsersResult<()>;

    /// Delete the account and return it as it was
    async fn delete_by_id(&self, user_id: &UserId) -> UsersResult<Option<User>>;
}

/// Post repository (ownership queries only)
#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    /// Posts with the given ids, in the order of `post_ids`
    async fn find_by_ids(&self, post_ids: &[PostId]) -> UsersResult<Vec<Post>>;

    /// Delete every listed post, returning how many existed
    async fn delete_many(&self, post_ids: &[PostId]) -> UsersResult<u64>;
}

/// Web session repository
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Find a session that has not expired yet
    async fn find_session(&self, session_id: &SessionId) -> UsersResult<Option<WebSession>>;

    /// Insert or replace
    async fn save_session(&self, session: &WebSession) -> UsersResult<()>;

    async fn delete_session(&self, session_id: &SessionId) -> UsersResult<()>;

    /// Remove expired sessions, returning the number deleted
    async fn cleanup_expired(&self) -> UsersResult<u64>;
}

/// Everything the HTTP layer needs from one store
pub trait UsersStore:
    UserRepository + PostRepository + SessionRepository + Clone + Send + Sync + 'static
{
}

impl<T> UsersStore for T where
    T: UserRepository + PostRepository + SessionRepository + Clone + Send + Sync + 'static
{
}
