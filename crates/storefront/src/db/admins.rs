//! Admin credential repository for the `admins` table.

use serde::Deserialize;

use crate::supabase::{SupabaseClient, SupabaseError};

const TABLE: &str = "admins";

/// The only column the login check needs.
#[derive(Deserialize)]
struct PasswordRow {
    password: String,
}

/// Repository for admin credentials.
pub struct AdminRepository<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Get the stored password (plain or Argon2 hash) for a username.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no admin has that username, or
    /// another `SupabaseError` if the request fails.
    pub async fn stored_password(&self, username: &str) -> Result<String, SupabaseError> {
        let row: PasswordRow = self
            .client
            .select_single_eq(TABLE, "password", "username", username)
            .await?;
        Ok(row.password)
    }
}
