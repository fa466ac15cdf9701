//! CLI command implementations.

pub mod admin;
pub mod catalog;

use thiserror::Error;

use shopfront_storefront::config::ConfigError;
use shopfront_storefront::services::auth::AuthError;
use shopfront_storefront::supabase::SupabaseError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The hosted database call failed.
    #[error("Remote store error: {0}")]
    Supabase(#[from] SupabaseError),

    /// Password hashing failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No password was given.
    #[error("Password cannot be empty")]
    EmptyPassword,
}
