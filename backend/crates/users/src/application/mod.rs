//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod delete_account;
pub mod login;
pub mod profile;
pub mod provider_sign_in;
pub mod register;
pub mod send_message;
pub mod update_account;

// Re-exports
pub use config::{RouteGuards, UsersConfig};
pub use delete_account::DeleteAccountUseCase;
pub use login::{LoginInput, LoginUseCase};
pub use profile::ProfileUseCase;
pub use provider_sign_in::ProviderSignInUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use send_message::{SendMessageInput, SendMessageUseCase};
pub use update_account::{UpdateAccountInput, UpdateAccountUseCase};
