//! HTTP Handlers
//!
//! Every handler takes the per-request [`SessionContext`] and ends by
//! committing (or destroying) it, so the `Set-Cookie` header always matches
//! what was stored. Validation conflicts and failed logins become a flash
//! message plus a redirect; every other error goes to `UsersError`'s
//! `IntoResponse`.

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;
use std::sync::Arc;

use crate::application::config::UsersConfig;
use crate::application::{
    DeleteAccountUseCase, LoginInput, LoginUseCase, ProfileUseCase, ProviderSignInUseCase,
    RegisterInput, RegisterUseCase, SendMessageInput, SendMessageUseCase, UpdateAccountInput,
    UpdateAccountUseCase,
};
use crate::domain::gateway::{IdentityProvider, MailTransport};
use crate::domain::repository::UsersStore;
use crate::domain::value_object::UserId;
use crate::error::{UsersError, UsersResult};
use crate::presentation::dto::{
    LoginForm, PostView, ProviderCallbackQuery, RegisterForm, SendMessageForm, SessionView,
    UpdateAccountForm, UserView,
};
use crate::presentation::session::SessionContext;
use crate::presentation::view::{JsonViewRenderer, ViewRenderer};

pub const LOGIN_PATH: &str = "/users/login";
pub const REGISTER_PATH: &str = "/users/register";
pub const POSTS_PATH: &str = "/posts";

pub const EMAIL_SENT_MESSAGE: &str = "Email sent";

/// Shared state for users handlers
#[derive(Clone)]
pub struct UsersAppState<R>
where
    R: UsersStore,
{
    pub repo: Arc<R>,
    pub config: Arc<UsersConfig>,
    pub mailer: Arc<dyn MailTransport>,
    /// `None` when third-party sign-in is not configured
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub views: Arc<dyn ViewRenderer>,
}

impl<R> UsersAppState<R>
where
    R: UsersStore,
{
    pub fn new(repo: R, config: UsersConfig, mailer: Arc<dyn MailTransport>) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            mailer,
            identity: None,
            views: Arc::new(JsonViewRenderer),
        }
    }

    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_views(mut self, views: Arc<dyn ViewRenderer>) -> Self {
        self.views = views;
        self
    }

    /// Render `template` with `model`, adding the session view
    fn render(&self, template: &str, mut model: serde_json::Value, session: &SessionContext) -> Response {
        model["session"] = json!(SessionView::from(&**session));
        self.views.render(template, model)
    }

    fn identity(&self) -> UsersResult<&Arc<dyn IdentityProvider>> {
        self.identity.as_ref().ok_or(UsersError::ProviderDisabled)
    }
}

/// Ids that do not parse cannot name an account
fn parse_user_id(raw: &str) -> UsersResult<UserId> {
    raw.parse().map_err(|_| UsersError::UserNotFound)
}

fn profile_path(user_id: &UserId) -> String {
    format!("/users/{user_id}")
}

/// Commit the session and redirect
async fn redirect_with_session<R>(
    state: &UsersAppState<R>,
    session: SessionContext,
    to: &str,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let cookie = session.commit(state.repo.as_ref(), &state.config).await?;
    Ok((cookie, Redirect::to(to)).into_response())
}

/// Render a page, consuming any pending flash message
async fn render_with_session<R>(
    state: &UsersAppState<R>,
    mut session: SessionContext,
    template: &str,
    mut model: serde_json::Value,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    model["message"] = json!(session.take_message());
    let page = state.render(template, model, &session);
    let cookie = session.commit(state.repo.as_ref(), &state.config).await?;
    Ok((cookie, page).into_response())
}

// ============================================================================
// Third-party Sign-in
// ============================================================================

/// GET /users/auth/provider
pub async fn provider_sign_in<R>(
    State(state): State<UsersAppState<R>>,
    mut session: SessionContext,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let request = state.identity()?.authorization_request();
    session.begin_provider_sign_in(request.state, request.pkce_verifier);

    redirect_with_session(&state, session, &request.url).await
}

/// GET /users/oauth2callback
pub async fn provider_callback<R>(
    State(state): State<UsersAppState<R>>,
    mut session: SessionContext,
    Query(query): Query<ProviderCallbackQuery>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let identity = state.identity()?.clone();
    let pending = session.take_provider_sign_in();

    let code = match (query.error, query.code, query.state, pending) {
        (None, Some(code), Some(returned), Some((expected, verifier)))
            if platform::crypto::secrets_match(
                &state.config.session_secret,
                expected.as_bytes(),
                returned.as_bytes(),
            ) =>
        {
            Some((code, verifier))
        }
        (error, ..) => {
            tracing::warn!(error = ?error, "Provider sign-in rejected at callback");
            None
        }
    };

    let Some((code, verifier)) = code else {
        return redirect_with_session(&state, session, LOGIN_PATH).await;
    };

    let profile = match identity.exchange_code(&code, &verifier).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Provider code exchange failed");
            return redirect_with_session(&state, session, LOGIN_PATH).await;
        }
    };

    let use_case = ProviderSignInUseCase::new(state.repo.clone());
    let user = match use_case.execute(profile).await {
        Ok(user) => user,
        // Unusable profile, or a concurrent first sign-in won the race
        Err(e @ (UsersError::Provider(_) | UsersError::Taken(_) | UsersError::InvalidInput(_))) => {
            tracing::warn!(error = %e, "Provider account could not be resolved");
            return redirect_with_session(&state, session, LOGIN_PATH).await;
        }
        Err(e) => return Err(e),
    };

    session.clear_message();
    session.log_in(user.user_id, user.name.as_str());

    let target = if user.needs_profile_completion() {
        format!("{REGISTER_PATH}/{}", user.user_id)
    } else {
        POSTS_PATH.to_string()
    };

    redirect_with_session(&state, session, &target).await
}

/// GET /users/logout/provider
pub async fn provider_sign_out<R>(
    State(state): State<UsersAppState<R>>,
    mut session: SessionContext,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    if let Some(user_id) = session.user_id {
        tracing::info!(user_id = %user_id, "Provider session signed out");
    }
    session.log_out();

    redirect_with_session(&state, session, POSTS_PATH).await
}

// ============================================================================
// Forms
// ============================================================================

/// GET /users/login
pub async fn login_form<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    render_with_session(&state, session, "users/login", json!({})).await
}

/// GET /users/register
pub async fn register_form<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    render_with_session(&state, session, "users/new", json!({})).await
}

/// GET /users/register/{id}
pub async fn provider_register_form<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let user_id = parse_user_id(&id)?;
    render_with_session(
        &state,
        session,
        "users/new_provider",
        json!({ "userId": user_id.to_string() }),
    )
    .await
}

// ============================================================================
// Local Registration / Login / Logout
// ============================================================================

/// POST /users/register
pub async fn register<R>(
    State(state): State<UsersAppState<R>>,
    mut session: SessionContext,
    Form(form): Form<RegisterForm>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        name: form.name,
        email: form.email,
        phone: form.phone,
        linkedin: form.linkedin,
        password: form.password,
    };

    match use_case.execute(input).await {
        Ok(user) => {
            session.clear_message();
            session.log_in(user.user_id, user.name.as_str());
            redirect_with_session(&state, session, POSTS_PATH).await
        }
        Err(e) => {
            let message = e.flash_message().ok_or(e)?;
            session.set_message(message);
            redirect_with_session(&state, session, REGISTER_PATH).await
        }
    }
}

/// POST /users/login
pub async fn login<R>(
    State(state): State<UsersAppState<R>>,
    mut session: SessionContext,
    Form(form): Form<LoginForm>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let input = LoginInput {
        name: form.name,
        password: form.password,
    };

    match use_case.execute(input).await {
        Ok(user) => {
            session.clear_message();
            session.log_in(user.user_id, user.name.as_str());
            redirect_with_session(&state, session, POSTS_PATH).await
        }
        Err(UsersError::InvalidCredentials) => {
            session.set_message(UsersError::InvalidCredentials.to_string());
            redirect_with_session(&state, session, LOGIN_PATH).await
        }
        Err(e) => Err(e),
    }
}

/// GET /users/logout
pub async fn logout<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
) -> Response
where
    R: UsersStore,
{
    let user_id = session.user_id;

    match session.destroy(state.repo.as_ref(), &state.config).await {
        Ok(cookie) => {
            if let Some(user_id) = user_id {
                tracing::info!(user_id = %user_id, "User logged out");
            }
            (cookie, Redirect::to(LOGIN_PATH)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to destroy session on logout");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// GET /users/{id}
pub async fn show_profile<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let user_id = parse_user_id(&id)?;
    let use_case = ProfileUseCase::new(state.repo.clone(), state.repo.clone());
    let (user, posts) = use_case.with_posts(&user_id).await?;

    let posts: Vec<PostView> = posts.iter().map(PostView::from).collect();
    let model = json!({
        "user": UserView::from(&user),
        "posts": posts,
    });

    render_with_session(&state, session, "users/show", model).await
}

/// GET /users/{id}/message
pub async fn message_form<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let user_id = parse_user_id(&id)?;
    let use_case = ProfileUseCase::new(state.repo.clone(), state.repo.clone());
    let user = use_case.find(&user_id).await?;

    render_with_session(
        &state,
        session,
        "users/message",
        json!({ "user": UserView::from(&user) }),
    )
    .await
}

/// GET /users/{id}/edit
pub async fn edit_form<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    owner_form(&state, session, &id, "users/edit").await
}

/// GET /users/{id}/delete
pub async fn delete_form<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    owner_form(&state, session, &id, "users/delete").await
}

/// Render a form only the account owner may see; others go to the profile
async fn owner_form<R>(
    state: &UsersAppState<R>,
    session: SessionContext,
    id: &str,
    template: &str,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let user_id = parse_user_id(id)?;
    if !session.is_user(&user_id) {
        return redirect_with_session(state, session, &profile_path(&user_id)).await;
    }

    let use_case = ProfileUseCase::new(state.repo.clone(), state.repo.clone());
    let user = use_case.find(&user_id).await?;

    render_with_session(state, session, template, json!({ "user": UserView::from(&user) })).await
}

// ============================================================================
// Messages
// ============================================================================

/// POST /users/messages
pub async fn send_message<R>(
    State(state): State<UsersAppState<R>>,
    mut session: SessionContext,
    Form(form): Form<SendMessageForm>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let use_case = SendMessageUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let input = SendMessageInput {
        sender_id: session.user_id,
        to_email: form.to_email,
        subject: form.subject,
        text: form.text,
    };

    let recipient = use_case.execute(input).await?;

    session.set_message(EMAIL_SENT_MESSAGE);
    redirect_with_session(&state, session, &profile_path(&recipient.user_id)).await
}

// ============================================================================
// Account Update / Delete
// ============================================================================

/// PUT /users/{id}
pub async fn update_account<R>(
    State(state): State<UsersAppState<R>>,
    mut session: SessionContext,
    Path(id): Path<String>,
    Form(form): Form<UpdateAccountForm>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let user_id = parse_user_id(&id)?;
    let target = profile_path(&user_id);

    // Behind the login gate, only the owner may edit
    if state.config.guards.update_account && !session.is_user(&user_id) {
        return redirect_with_session(&state, session, &target).await;
    }

    let use_case = UpdateAccountUseCase::new(state.repo.clone());

    let input = UpdateAccountInput {
        name: form.name,
        email: form.email,
        phone: form.phone,
        linkedin: form.linkedin,
    };

    match use_case.execute(&user_id, input).await {
        Ok(user) => {
            if session.is_user(&user.user_id) {
                session.name = Some(user.name.to_string());
            }
            redirect_with_session(&state, session, &target).await
        }
        Err(e) => {
            let message = e.flash_message().ok_or(e)?;
            session.set_message(message);
            redirect_with_session(&state, session, &target).await
        }
    }
}

/// DELETE /users/{id}
pub async fn delete_account<R>(
    State(state): State<UsersAppState<R>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> UsersResult<Response>
where
    R: UsersStore,
{
    let user_id = parse_user_id(&id)?;

    let use_case = DeleteAccountUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.execute(&user_id).await?;

    let cookie = match session.destroy(state.repo.as_ref(), &state.config).await {
        Ok(cookie) => cookie,
        Err(e) => {
            // The account is already gone; still leave the page
            tracing::warn!(error = %e, user_id = %user_id, "Failed to destroy session after account deletion");
            Default::default()
        }
    };

    Ok((cookie, Redirect::to(POSTS_PATH)).into_response())
}
