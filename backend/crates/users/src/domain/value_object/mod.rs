//! Value Object Module

pub mod contact;
pub mod email;
pub mod user_name;

pub use kernel::id::{PostId, SessionId, UserId};
