//! Shopper identity.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Customer`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerError {
    /// The name is empty after trimming.
    #[error("name cannot be empty")]
    EmptyName,
    /// The contact identifier is empty after trimming.
    #[error("phone or identifier cannot be empty")]
    EmptyNumber,
}

/// The visitor's self-declared name and contact identifier.
///
/// Entirely visitor-owned: persisted in their own storage, never checked
/// against the remote store and never required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Display name.
    pub name: String,
    /// Phone number or any other contact identifier.
    pub number: String,
}

impl Customer {
    /// Parse a customer from form input, trimming both fields.
    ///
    /// # Errors
    ///
    /// Returns an error if either field is blank.
    pub fn parse(name: &str, number: &str) -> Result<Self, CustomerError> {
        let name = name.trim();
        let number = number.trim();

        if name.is_empty() {
            return Err(CustomerError::EmptyName);
        }
        if number.is_empty() {
            return Err(CustomerError::EmptyNumber);
        }

        Ok(Self {
            name: name.to_owned(),
            number: number.to_owned(),
        })
    }
}
