//! Login Use Case
//!
//! Authenticates a local account by name and password. Every failure is
//! reported as the same `InvalidCredentials` so the response never reveals
//! which part was wrong.

use std::sync::Arc;

use platform::password::PlainPassword;

use crate::application::config::UsersConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{UsersError, UsersResult};

/// Login input
pub struct LoginInput {
    pub name: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<UsersConfig>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<UsersConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: LoginInput) -> UsersResult<User> {
        let Some(user) = self.user_repo.find_by_name(input.name.trim()).await? else {
            tracing::warn!("Login failed: unknown name");
            return Err(UsersError::InvalidCredentials);
        };

        // Provider-only accounts have no password to check against
        let Some(stored) = &user.password else {
            tracing::warn!(user_id = %user.user_id, "Login failed: no local password");
            return Err(UsersError::InvalidCredentials);
        };

        let verified = PlainPassword::new(input.password)
            .map(|password| stored.verify(&password, self.config.pepper()))
            .unwrap_or(false);

        if !verified {
            tracing::warn!(user_id = %user.user_id, "Login failed: wrong password");
            return Err(UsersError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(user)
    }
}
