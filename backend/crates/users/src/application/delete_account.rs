//! Delete Account Use Case
//!
//! Removes an account and then every post it owns. There is no rollback:
//! if removing the posts fails, the account stays deleted.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::{PostRepository, UserRepository};
use crate::domain::value_object::UserId;
use crate::error::{UsersError, UsersResult};

pub struct DeleteAccountUseCase<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    user_repo: Arc<U>,
    post_repo: Arc<P>,
}

impl<U, P> DeleteAccountUseCase<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    pub fn new(user_repo: Arc<U>, post_repo: Arc<P>) -> Self {
        Self {
            user_repo,
            post_repo,
        }
    }

    /// Delete the account, returning it as it was
    pub async fn execute(&self, user_id: &UserId) -> UsersResult<User> {
        let user = self
            .user_repo
            .delete_by_id(user_id)
            .await?
            .ok_or(UsersError::UserNotFound)?;

        let posts_deleted = if user.post_ids.is_empty() {
            0
        } else {
            self.post_repo.delete_many(&user.post_ids).await?
        };

        tracing::info!(user_id = %user.user_id, posts_deleted, "User account deleted");

        Ok(user)
    }
}
