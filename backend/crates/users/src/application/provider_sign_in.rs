//! Provider Sign-In Use Case
//!
//! Resolves the identity returned by the provider to a local account:
//! 1. an account already linked to the provider subject
//! 2. otherwise an account with the same email, which gets linked
//! 3. otherwise a new provider-only account
//!
//! A newly created account keeps `created_at == updated_at` until its
//! details are completed, which the callback uses to decide where to go next.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::gateway::ProviderProfile;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{UsersError, UsersResult};

/// How many numbered variants of a taken name are tried
const MAX_NAME_ATTEMPTS: u32 = 20;

pub struct ProviderSignInUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ProviderSignInUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, profile: ProviderProfile) -> UsersResult<User> {
        if let Some(user) = self
            .user_repo
            .find_by_provider_subject(&profile.subject)
            .await?
        {
            tracing::info!(user_id = %user.user_id, "Provider sign-in for linked account");
            return Ok(user);
        }

        let email = Email::new(&profile.email)
            .map_err(|e| UsersError::Provider(format!("unusable email from provider: {e}")))?;

        if let Some(mut user) = self.user_repo.find_by_email(email.as_str()).await? {
            user.link_provider(profile.subject);
            self.user_repo.update(&user).await?;
            tracing::info!(user_id = %user.user_id, "Provider identity linked to existing account");
            return Ok(user);
        }

        let name = self.available_name(&profile, &email).await?;
        let user = User::new_from_provider(name, email, profile.subject);
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, name = %user.name, "User created from provider sign-in");

        Ok(user)
    }

    /// Provider display name (or the email's local part), numbered if taken
    async fn available_name(&self, profile: &ProviderProfile, email: &Email) -> UsersResult<UserName> {
        let base = profile
            .name
            .as_deref()
            .and_then(|name| UserName::new(name).ok())
            .map_or_else(|| UserName::new(email.local_part()), Ok)?;

        if self.user_repo.find_by_name(base.as_str()).await?.is_none() {
            return Ok(base);
        }

        for n in 2..=MAX_NAME_ATTEMPTS {
            let candidate = base.with_suffix(n);
            if self.user_repo.find_by_name(candidate.as_str()).await?.is_none() {
                return Ok(candidate);
            }
        }

        // Fall back to a suffix derived from a fresh id
        let entropy = uuid::Uuid::new_v4().as_u128() as u32 % 1_000_000;
        Ok(base.with_suffix(entropy))
    }
}
