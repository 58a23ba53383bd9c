//! Entity Module

pub mod post;
pub mod user;
pub mod web_session;

pub use post::Post;
pub use user::{User, UserChanges};
pub use web_session::WebSession;
