//! Users Router
//!
//! Paths are relative; the binary nests this router under `/users`.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{MethodRouter, delete, get, post, put},
};
use std::sync::Arc;

use crate::application::config::UsersConfig;
use crate::domain::gateway::{IdentityProvider, MailTransport};
use crate::domain::repository::UsersStore;
use crate::infra::postgres::PgUsersRepository;
use crate::presentation::handlers::{self, UsersAppState};
use crate::presentation::middleware::require_login;

/// Create the users router with the PostgreSQL repository
pub fn users_router(
    repo: PgUsersRepository,
    config: UsersConfig,
    mailer: Arc<dyn MailTransport>,
    identity: Option<Arc<dyn IdentityProvider>>,
) -> Router {
    let mut state = UsersAppState::new(repo, config, mailer);
    if let Some(identity) = identity {
        state = state.with_identity_provider(identity);
    }
    users_router_generic(state)
}

/// Create the users router for any store implementation
pub fn users_router_generic<R>(state: UsersAppState<R>) -> Router
where
    R: UsersStore,
{
    let guards = state.config.guards;
    let gate = |route: MethodRouter<UsersAppState<R>>, gated: bool| {
        if gated {
            route.route_layer(from_fn_with_state(state.clone(), require_login))
        } else {
            route
        }
    };

    Router::new()
        // Third-party sign-in
        .route("/auth/provider", get(handlers::provider_sign_in::<R>))
        .route("/oauth2callback", get(handlers::provider_callback::<R>))
        .route("/logout/provider", get(handlers::provider_sign_out::<R>))
        // Local accounts
        .route(
            "/login",
            get(handlers::login_form::<R>).post(handlers::login::<R>),
        )
        .route(
            "/register",
            get(handlers::register_form::<R>).post(handlers::register::<R>),
        )
        .route("/register/{id}", get(handlers::provider_register_form::<R>))
        .route("/logout", get(handlers::logout::<R>))
        // Messages
        .route(
            "/messages",
            gate(post(handlers::send_message::<R>), guards.send_message),
        )
        // Account pages
        .route(
            "/{id}",
            gate(get(handlers::show_profile::<R>), true)
                .merge(gate(delete(handlers::delete_account::<R>), guards.delete_account))
                .merge(gate(put(handlers::update_account::<R>), guards.update_account)),
        )
        .route("/{id}/message", gate(get(handlers::message_form::<R>), true))
        .route("/{id}/edit", gate(get(handlers::edit_form::<R>), true))
        .route("/{id}/delete", gate(get(handlers::delete_form::<R>), true))
        .with_state(state)
}
