//! User Entity
//!
//! An account on the classifieds site, created either by local registration
//! or by a first sign-in through the identity provider.

use chrono::{DateTime, SubsecRound, Utc};
use kernel::error::app_error::AppResult;
use platform::password::StoredPassword;

use crate::domain::value_object::{
    PostId, UserId, contact::optional_contact, email::Email, user_name::UserName,
};

/// Current time at the precision the store keeps (microseconds), so that
/// timestamp equality survives a round trip through PostgreSQL.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// User entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: UserId,
    /// Display name, unique, also the local login identifier
    pub name: UserName,
    pub email: Email,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    /// Absent for accounts that only ever signed in through the provider
    pub password: Option<StoredPassword>,
    /// Stable subject identifier assigned by the identity provider
    pub provider_subject: Option<String>,
    /// Owned posts, in insertion order
    pub post_ids: Vec<PostId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable profile fields
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: UserName,
    pub email: Email,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

impl UserChanges {
    /// Validate raw form values
    pub fn parse(
        name: &str,
        email: &str,
        phone: Option<&str>,
        linkedin: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            name: UserName::new(name)?,
            email: Email::new(email)?,
            phone: optional_contact(phone, "Phone Number")?,
            linkedin: optional_contact(linkedin, "linkedIn")?,
        })
    }
}

impl User {
    /// Account created through the registration form
    pub fn new_local(
        name: UserName,
        email: Email,
        phone: Option<String>,
        linkedin: Option<String>,
        password: StoredPassword,
    ) -> Self {
        let now = now();

        Self {
            user_id: UserId::new(),
            name,
            email,
            phone,
            linkedin,
            password: Some(password),
            provider_subject: None,
            post_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Account created by a first provider sign-in; no password
    pub fn new_from_provider(name: UserName, email: Email, subject: impl Into<String>) -> Self {
        let now = now();

        Self {
            user_id: UserId::new(),
            name,
            email,
            phone: None,
            linkedin: None,
            password: None,
            provider_subject: Some(subject.into()),
            post_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Never updated since creation
    ///
    /// For provider accounts this means the registration details were never
    /// completed.
    pub fn needs_profile_completion(&self) -> bool {
        self.created_at == self.updated_at
    }

    /// Apply an edit from the profile form
    pub fn apply(&mut self, changes: UserChanges) {
        self.name = changes.name;
        self.email = changes.email;
        self.phone = changes.phone;
        self.linkedin = changes.linkedin;
        self.touch();
    }

    /// Attach a provider identity to an existing account
    pub fn link_provider(&mut self, subject: impl Into<String>) {
        self.provider_subject = Some(subject.into());
        self.touch();
    }

    fn touch(&mut self) {
        let now = now();
        // A bump within the same microsecond must still register as an update.
        self.updated_at = if now > self.created_at {
            now
        } else {
            self.created_at + chrono::Duration::microseconds(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::PlainPassword;

    fn sample_local() -> User {
        let stored = PlainPassword::new("password123").unwrap().hash(None).unwrap();
        User::new_local(
            UserName::new("alice").unwrap(),
            Email::new("a@x.com").unwrap(),
            None,
            None,
            stored,
        )
    }

    #[test]
    fn test_new_local_user() {
        let user = sample_local();
        assert!(user.password.is_some());
        assert!(user.provider_subject.is_none());
        assert!(user.post_ids.is_empty());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_provider_user_needs_completion_until_updated() {
        let mut user = User::new_from_provider(
            UserName::new("Bob").unwrap(),
            Email::new("bob@example.com").unwrap(),
            "sub-123",
        );
        assert!(user.password.is_none());
        assert!(user.needs_profile_completion());

        user.apply(UserChanges {
            name: UserName::new("Bob").unwrap(),
            email: Email::new("bob@example.com").unwrap(),
            phone: Some("555-0100".to_string()),
            linkedin: None,
        });
        assert!(!user.needs_profile_completion());
        assert!(user.updated_at > user.created_at);
    }

    #[test]
    fn test_link_provider_marks_returning() {
        let mut user = sample_local();
        user.link_provider("sub-9");
        assert_eq!(user.provider_subject.as_deref(), Some("sub-9"));
        assert!(!user.needs_profile_completion());
    }
}
