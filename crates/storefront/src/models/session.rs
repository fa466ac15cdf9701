//! Session-related types.
//!
//! The visitor's cookie session plays the role of their private key-value
//! storage: shop state and the admin flag are kept there as JSON strings
//! through [`SessionStore`].

use serde_json::Value;
use tower_sessions::Session;

use shopfront_core::KeyValueStore;

/// Session keys owned by the storefront itself.
///
/// Shop state keys (`shop_customer`, `shop_cart`, `is_admin`) are defined in
/// `shopfront_core::storage::keys`.
pub mod keys {
    /// One-shot notice shown on the next admin page render.
    pub const FLASH: &str = "flash";
}

/// [`KeyValueStore`] over a `tower-sessions` session.
#[derive(Clone)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    /// Wrap a request's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl KeyValueStore for SessionStore {
    type Error = tower_sessions::session::Error;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        // Anything other than a string under one of our keys was not written
        // by us; treat it as absent.
        Ok(match self.session.get::<Value>(key).await? {
            Some(Value::String(raw)) => Some(raw),
            _ => None,
        })
    }

    async fn set(&self, key: &str, value: String) -> Result<(), Self::Error> {
        self.session.insert(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.session.remove::<Value>(key).await?;
        Ok(())
    }
}

/// Queue a notice for the next admin page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(
    session: &Session,
    message: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FLASH, message).await
}

/// Take (and clear) the queued notice, if any.
///
/// Session failures are logged and read as "no notice".
pub async fn take_flash(session: &Session) -> Option<String> {
    match session.remove::<String>(keys::FLASH).await {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Failed to read flash message from session: {e}");
            None
        }
    }
}
