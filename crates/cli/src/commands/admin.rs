//! Admin credential commands.
//!
//! # Usage
//!
//! ```bash
//! # Interactive (password on stdin)
//! shopfront-cli admin hash-password
//!
//! # Non-interactive
//! shopfront-cli admin hash-password -p 'correct horse battery staple'
//! ```
//!
//! Paste the printed hash into the `password` column of the `admins` table.
//! Plain-text rows keep working; hashed rows are verified with Argon2.

use std::io::BufRead;

use secrecy::{ExposeSecret, SecretString};

use super::CommandError;

/// Read a single line from stdin as the password.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or the line is empty.
pub fn read_password_from_stdin() -> Result<SecretString, CommandError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CommandError::EmptyPassword);
    }

    Ok(SecretString::from(password.to_owned()))
}

/// Hash a password and print the PHC string.
///
/// # Errors
///
/// Returns an error if the password is empty or hashing fails.
#[allow(clippy::print_stdout)]
pub fn hash_password(password: &SecretString) -> Result<(), CommandError> {
    if password.expose_secret().is_empty() {
        return Err(CommandError::EmptyPassword);
    }

    let hash = shopfront_storefront::services::auth::hash_password(password.expose_secret())?;
    println!("{hash}");
    Ok(())
}
