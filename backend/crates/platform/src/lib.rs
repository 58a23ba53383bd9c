//! Platform Crate - Technical Infrastructure
//!
//! Technical building blocks used by the user-management service:
//! - Password hashing (Argon2id with per-password salt and optional pepper)
//! - Signed session tokens (HMAC-SHA256)
//! - Cookie header helpers

pub mod cookie;
pub mod crypto;
pub mod password;
