//! Authentication error types.

use thiserror::Error;

use crate::supabase::SupabaseError;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password left blank.
    #[error("username and password are required")]
    MissingCredentials,

    /// The credential lookup failed (unknown username or remote failure).
    #[error("credential lookup failed: {0}")]
    Lookup(#[from] SupabaseError),

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Stored hash could not be parsed, or hashing failed.
    #[error("password hashing error")]
    PasswordHash,
}
