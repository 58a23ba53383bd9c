//! Users Backend Module
//!
//! User management for the classifieds site, in the same layered layout as
//! the other backend crates:
//! - `domain/` - Entities, value objects, repository and gateway traits
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL and in-memory stores, mail transports, identity provider
//! - `presentation/` - Session extractor, HTTP handlers, forms, router
//!
//! ## Features
//! - Local registration and login (name + password)
//! - Third-party sign-in (OAuth 2.0 authorization code + PKCE)
//! - Server-side sessions with one-shot flash messages
//! - Profile show / edit / delete, owned posts removed with the account
//! - User-to-user email through a pluggable mail transport

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{RouteGuards, UsersConfig};
pub use error::{UniqueField, UsersError, UsersResult};
pub use infra::memory::MemoryUserStore;
pub use infra::postgres::PgUsersRepository;
pub use presentation::handlers::UsersAppState;
pub use presentation::router::{users_router, users_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
