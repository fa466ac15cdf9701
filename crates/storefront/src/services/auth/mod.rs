//! Admin authentication service.
//!
//! Admin credentials live in the hosted `admins` table. A successful check
//! only sets a flag in the visitor's session; there is no token and no
//! server-side account state.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::db::AdminRepository;
use crate::supabase::SupabaseClient;

/// Prefix of PHC strings produced by [`hash_password`].
const ARGON2_PREFIX: &str = "$argon2";

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self {
            admins: AdminRepository::new(client),
        }
    }

    /// Check a username/password pair against the `admins` table.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if either field is blank.
    /// Returns `AuthError::Lookup` if the username is unknown or the lookup fails.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let stored = self.admins.stored_password(username).await?;

        if verify_password(password, &stored)? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Hash a password with Argon2 for storage in the `admins` table.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a password against a stored value.
///
/// Stored values that look like Argon2 PHC strings are verified as hashes;
/// anything else is compared as plain text, which is how rows entered by
/// hand in the hosted dashboard look.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if the stored hash is malformed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    if stored.starts_with(ARGON2_PREFIX) {
        let parsed = PasswordHash::new(stored).map_err(|_| AuthError::PasswordHash)?;
        return Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok());
    }

    Ok(constant_time_eq(password.as_bytes(), stored.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with(ARGON2_PREFIX));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_plain_stored_password() {
        assert!(verify_password("admin123", "admin123").unwrap());
        assert!(!verify_password("admin12", "admin123").unwrap());
        assert!(!verify_password("Admin123", "admin123").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(matches!(
            verify_password("x", "$argon2id$garbage"),
            Err(AuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"a", b"ab"));
    }
}
