//! Profile Use Case
//!
//! Read-side lookups behind the profile, compose, edit and delete pages.

use std::sync::Arc;

use crate::domain::entity::{post::Post, user::User};
use crate::domain::repository::{PostRepository, UserRepository};
use crate::domain::value_object::UserId;
use crate::error::{UsersError, UsersResult};

pub struct ProfileUseCase<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    user_repo: Arc<U>,
    post_repo: Arc<P>,
}

impl<U, P> ProfileUseCase<U, P>
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

    /// The account, or `UserNotFound`
    pub async fn find(&self, user_id: &UserId) -> UsersResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UsersError::UserNotFound)
    }

    /// The account together with the posts it owns
    pub async fn with_posts(&self, user_id: &UserId) -> UsersResult<(User, Vec<Post>)> {
        let user = self.find(user_id).await?;
        let posts = if user.post_ids.is_empty() {
            Vec::new()
        } else {
            self.post_repo.find_by_ids(&user.post_ids).await?
        };
        Ok((user, posts))
    }
}
