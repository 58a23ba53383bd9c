//! Register Use Case
//!
//! Creates a local account from the registration form.

use std::sync::Arc;

use platform::password::PlainPassword;

use crate::application::config::UsersConfig;
use crate::domain::entity::user::{User, UserChanges};
use crate::domain::repository::UserRepository;
use crate::error::{UniqueField, UsersError, UsersResult};

/// Register input
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<UsersConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<UsersConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> UsersResult<User> {
        let fields = UserChanges::parse(
            &input.name,
            &input.email,
            input.phone.as_deref(),
            input.linkedin.as_deref(),
        )?;

        // Reported in this order: name, email, phone, linkedin
        if self.user_repo.find_by_name(fields.name.as_str()).await?.is_some() {
            return Err(UsersError::Taken(UniqueField::Name));
        }
        if self.user_repo.find_by_email(fields.email.as_str()).await?.is_some() {
            return Err(UsersError::Taken(UniqueField::Email));
        }
        if let Some(phone) = &fields.phone {
            if self.user_repo.find_by_phone(phone).await?.is_some() {
                return Err(UsersError::Taken(UniqueField::Phone));
            }
        }
        if let Some(linkedin) = &fields.linkedin {
            if self.user_repo.find_by_linkedin(linkedin).await?.is_some() {
                return Err(UsersError::Taken(UniqueField::Linkedin));
            }
        }

        let password = PlainPassword::new(input.password)?;
        let stored = password
            .hash(self.config.pepper())
            .map_err(|e| UsersError::Internal(e.to_string()))?;

        let user = User::new_local(
            fields.name,
            fields.email,
            fields.phone,
            fields.linkedin,
            stored,
        );

        // A concurrent registration can still win the race; the store's
        // unique indexes report it as `Taken`.
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, name = %user.name, "User registered");

        Ok(user)
    }
}
