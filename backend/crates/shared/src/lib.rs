//! Shared Kernel
//!
//! Vocabulary shared by every backend crate of the classifieds service:
//! - Unified error type (`AppError`) and its HTTP classification (`ErrorKind`)
//! - Typed identifiers for users, posts and browser sessions
//!
//! Only things with the same meaning in every crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
