//! Application Configuration
//!
//! Configuration for the users application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Which of the normally open account routes require a logged-in session
///
/// Profile, compose, edit and delete-confirmation pages are always gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteGuards {
    /// `POST /messages`
    pub send_message: bool,
    /// `DELETE /{id}`
    pub delete_account: bool,
    /// `PUT /{id}`, also restricted to the account owner when set
    pub update_account: bool,
}

impl RouteGuards {
    /// Every account route requires login
    pub fn all() -> Self {
        Self {
            send_message: true,
            delete_account: true,
            update_account: true,
        }
    }
}

/// Users application configuration
#[derive(Debug, Clone)]
pub struct UsersConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Secret for signing the session cookie (32 bytes)
    pub session_secret: [u8; 32],
    /// Idle lifetime of a session
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Sender address of user-to-user messages
    pub mail_from: String,
    pub guards: RouteGuards,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "sid".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(14 * 24 * 3600), // 2 weeks
            cookie_secure: true,
            // Lax so the cookie survives the provider's redirect back
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            mail_from: "no-reply@localhost".to_string(),
            guards: RouteGuards::default(),
        }
    }
}

impl UsersConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Get session TTL in milliseconds
    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Attributes of the session cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs()),
        }
    }
}
