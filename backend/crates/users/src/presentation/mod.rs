//! Presentation Layer
//!
//! Session extractor, HTTP handlers, forms, views, router and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod session;
pub mod view;

pub use handlers::UsersAppState;
pub use middleware::require_login;
pub use router::{users_router, users_router_generic};
pub use session::{SessionContext, SetSessionCookie};
pub use view::{JsonViewRenderer, ViewRenderer};
