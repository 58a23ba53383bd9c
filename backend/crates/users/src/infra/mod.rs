//! Infrastructure Layer
//!
//! Store implementations and outbound service integrations.

pub mod mail;
pub mod memory;
pub mod oauth;
pub mod postgres;

pub use mail::{HttpMailTransport, LogMailTransport};
pub use memory::MemoryUserStore;
pub use oauth::{GoogleIdentityProvider, OAuthSettings};
pub use postgres::PgUsersRepository;
