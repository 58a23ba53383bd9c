//! Update Account Use Case
//!
//! Applies the profile edit form to an account.

use std::sync::Arc;

use crate::domain::entity::user::{User, UserChanges};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserId;
use crate::error::{UsersError, UsersResult};

pub struct UpdateAccountInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

pub struct UpdateAccountUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UpdateAccountUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Update the account and return its new state
    ///
    /// Conflicts with other accounts surface as `UsersError::Taken` from the
    /// store's unique indexes.
    pub async fn execute(&self, user_id: &UserId, input: UpdateAccountInput) -> UsersResult<User> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UsersError::UserNotFound)?;

        let changes = UserChanges::parse(
            &input.name,
            &input.email,
            input.phone.as_deref(),
            input.linkedin.as_deref(),
        )?;

        user.apply(changes);
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "User account updated");

        Ok(user)
    }
}
