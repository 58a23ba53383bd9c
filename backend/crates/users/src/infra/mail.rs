//! Mail Transports
//!
//! - [`HttpMailTransport`]: JSON mail API (Resend-compatible `POST /emails`)
//! - [`LogMailTransport`]: writes the message to the log instead of sending,
//!   for development when no API is configured

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;

use crate::domain::gateway::{MailTransport, OutgoingMail};
use crate::error::{UsersError, UsersResult};

/// Request body of the mail API
#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Mail API over HTTPS with bearer authentication
pub struct HttpMailTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpMailTransport {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> UsersResult<Self> {
        let client = ClientBuilder::new()
            .user_agent(concat!("users/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UsersError::Internal(format!("build mail client failed: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> UsersResult<()> {
        let body = SendEmailRequest {
            from: &mail.from,
            to: [&mail.to],
            subject: &mail.subject,
            text: &mail.text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UsersError::Mail(format!("send failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%status, "Mail accepted by API");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(UsersError::Mail(format!("mail API returned HTTP {status}: {detail}")))
    }
}

/// Logs messages instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> UsersResult<()> {
        tracing::info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            "Mail transport disabled; message not delivered"
        );
        Ok(())
    }
}
