//! Client for the hosted database's REST (PostgREST) endpoint.
//!
//! # Architecture
//!
//! - The hosted database is the source of truth - NO local copy, direct calls
//! - Generic table operations live on [`SupabaseClient`]; the typed
//!   repositories in [`crate::db`] pick the table and row types
//! - Every request carries the project's anonymous key as both `apikey` and
//!   bearer token
//! - No retries: a failed call surfaces a [`SupabaseError`] to the handler
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase)?;
//!
//! let items: Vec<Item> = client.select_all("items").await?;
//! let row: AdminRow = client
//!     .select_single_eq("admins", "password", "username", "owner")
//!     .await?;
//! ```

mod client;
pub mod filter;

pub use client::SupabaseClient;

use thiserror::Error;

/// Errors that can occur when talking to the hosted database.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A single-row query matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A single-row query matched more than one row.
    #[error("Expected exactly one row, got {0}")]
    UnexpectedRowCount(usize),

    /// Rate limited by the hosted service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl SupabaseError {
    /// Whether this error means "no such row".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_error_display() {
        let err = SupabaseError::NotFound("items id=eq.4".to_string());
        assert_eq!(err.to_string(), "Not found: items id=eq.4");

        let err = SupabaseError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(err.to_string(), "API error (401): Invalid API key");
    }

    #[test]
    fn test_is_not_found() {
        assert!(SupabaseError::NotFound(String::new()).is_not_found());
        assert!(!SupabaseError::UnexpectedRowCount(2).is_not_found());
    }
}
