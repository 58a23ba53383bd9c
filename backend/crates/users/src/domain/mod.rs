//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the contracts of
//! outbound collaborators (mail, identity provider).

pub mod entity;
pub mod gateway;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{post::Post, user::User, web_session::WebSession};
pub use gateway::{IdentityProvider, MailTransport};
pub use repository::{PostRepository, SessionRepository, UserRepository, UsersStore};
