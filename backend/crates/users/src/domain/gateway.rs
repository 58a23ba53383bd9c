//! Outbound Collaborators
//!
//! Contracts for the services this crate talks to but does not own: mail
//! delivery and the third-party identity provider. Both are used as trait
//! objects so the binary can pick an implementation at startup.

use async_trait::async_trait;

use crate::error::UsersResult;

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message; any failure is reported as `UsersError::Mail`
    async fn send(&self, mail: &OutgoingMail) -> UsersResult<()>;
}

/// Where to send the browser, plus what to remember until the callback
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    /// CSRF state echoed back by the provider
    pub state: String,
    pub pkce_verifier: String,
}

/// Identity asserted by the provider after a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent URL requesting the `profile` and `email` scopes
    fn authorization_request(&self) -> AuthorizationRequest;

    /// Exchange an authorization code for the signed-in user's profile
    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> UsersResult<ProviderProfile>;
}
