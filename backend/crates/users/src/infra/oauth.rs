//! Google Identity Provider
//!
//! OAuth 2.0 authorization code flow with PKCE against Google's endpoints.
//! The CSRF state and PKCE verifier are handed back to the caller, which
//! keeps them in the browser's session until the callback.

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::domain::gateway::{AuthorizationRequest, IdentityProvider, ProviderProfile};
use crate::error::{UsersError, UsersResult};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// OAuth client type with auth URL and token URL set
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Client registration with the provider
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Absolute URL of `/users/oauth2callback`
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl OAuthSettings {
    /// Settings for Google's public endpoints
    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Google userinfo API response
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: String,
    name: Option<String>,
}

pub struct GoogleIdentityProvider {
    client: ConfiguredClient,
    http: reqwest::Client,
    userinfo_url: String,
}

impl GoogleIdentityProvider {
    pub fn new(settings: OAuthSettings) -> UsersResult<Self> {
        let invalid = |what: &str, e: oauth2::url::ParseError| {
            UsersError::Internal(format!("invalid OAuth {what}: {e}"))
        };

        let client = BasicClient::new(ClientId::new(settings.client_id))
            .set_client_secret(ClientSecret::new(settings.client_secret))
            .set_auth_uri(AuthUrl::new(settings.auth_url).map_err(|e| invalid("auth URL", e))?)
            .set_token_uri(TokenUrl::new(settings.token_url).map_err(|e| invalid("token URL", e))?)
            .set_redirect_uri(
                RedirectUrl::new(settings.redirect_url).map_err(|e| invalid("redirect URL", e))?,
            );

        // Token endpoint must not be followed through redirects
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| UsersError::Internal(format!("build OAuth HTTP client failed: {e}")))?;

        Ok(Self {
            client,
            http,
            userinfo_url: settings.userinfo_url,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_request(&self) -> AuthorizationRequest {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (url, csrf_state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("profile".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        AuthorizationRequest {
            url: url.to_string(),
            state: csrf_state.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        }
    }

    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> UsersResult<ProviderProfile> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| UsersError::Provider(format!("token exchange failed: {e}")))?;

        let user: GoogleUser = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| UsersError::Provider(format!("userinfo request failed: {e}")))?
            .json()
            .await
            .map_err(|e| UsersError::Provider(format!("userinfo decode failed: {e}")))?;

        Ok(ProviderProfile {
            subject: user.id,
            email: user.email,
            name: user.name,
        })
    }
}
