//! Send Message Use Case
//!
//! Emails another user on behalf of the logged-in sender.

use std::sync::Arc;

use crate::application::config::UsersConfig;
use crate::domain::entity::user::User;
use crate::domain::gateway::{MailTransport, OutgoingMail};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, email::Email};
use crate::error::{UsersError, UsersResult};

pub struct SendMessageInput {
    /// Authenticated user of the current session, if any
    pub sender_id: Option<UserId>,
    pub to_email: String,
    pub subject: String,
    pub text: String,
}

pub struct SendMessageUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    mailer: Arc<dyn MailTransport>,
    config: Arc<UsersConfig>,
}

impl<U> SendMessageUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<dyn MailTransport>, config: Arc<UsersConfig>) -> Self {
        Self {
            user_repo,
            mailer,
            config,
        }
    }

    /// Send the message and return the recipient
    pub async fn execute(&self, input: SendMessageInput) -> UsersResult<User> {
        let sender_id = input.sender_id.ok_or(UsersError::LoginRequired)?;
        let sender = self
            .user_repo
            .find_by_id(&sender_id)
            .await?
            .ok_or(UsersError::LoginRequired)?;

        // Resolve the recipient first so nothing is sent to unknown addresses
        let to = Email::new(&input.to_email)?;
        let recipient = self
            .user_repo
            .find_by_email(to.as_str())
            .await?
            .ok_or(UsersError::UserNotFound)?;

        let mail = OutgoingMail {
            from: self.config.mail_from.clone(),
            to: to.to_string(),
            subject: format!("{} sent from user {}", input.subject, sender.name),
            text: input.text,
        };

        self.mailer.send(&mail).await?;

        tracing::info!(
            sender_id = %sender.user_id,
            recipient_id = %recipient.user_id,
            "User message sent"
        );

        Ok(recipient)
    }
}
