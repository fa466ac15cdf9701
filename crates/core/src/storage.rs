//! Per-visitor key-value persistence.
//!
//! The shopper's identity, their cart and the admin gate flag are plain JSON
//! strings kept in storage that belongs to the visitor (a cookie session in
//! the server). [`ShopState`] is the typed view of those blobs; handlers load
//! it at the start of a request and save it back before responding.
//!
//! Malformed blobs are never an error: they are logged and read as absent.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cart::Cart;
use crate::types::Customer;

/// Storage keys.
pub mod keys {
    /// JSON-encoded [`Customer`](crate::Customer).
    pub const CUSTOMER: &str = "shop_customer";

    /// JSON-encoded [`Cart`](crate::Cart).
    pub const CART: &str = "shop_cart";

    /// Admin gate flag.
    pub const ADMIN: &str = "is_admin";
}

/// Value written under [`keys::ADMIN`] once an admin has logged in.
const ADMIN_FLAG: &str = "1";

/// A string-to-string store owned by a single visitor.
pub trait KeyValueStore: Send + Sync {
    /// Error raised by the underlying store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), Self::Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Read a JSON blob, treating a malformed one as absent.
async fn load_json<S, T>(store: &S, key: &str) -> Result<Option<T>, S::Error>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored value");
            Ok(None)
        }
    }
}

async fn save_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), S::Error>
where
    S: KeyValueStore,
    T: Serialize + Sync,
{
    // Cart and Customer serialization cannot fail: string keys, plain fields.
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, raw).await,
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to encode value for storage");
            Ok(())
        }
    }
}

/// The visitor's persisted shop state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopState {
    /// Who is shopping, once they have introduced themselves.
    pub customer: Option<Customer>,
    /// What they intend to buy.
    pub cart: Cart,
}

impl ShopState {
    /// Load the state from a store.
    ///
    /// Missing or malformed blobs yield an empty cart and no customer.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be read.
    pub async fn load<S: KeyValueStore>(store: &S) -> Result<Self, S::Error> {
        let customer = load_json::<_, Customer>(store, keys::CUSTOMER).await?;
        let cart = load_json::<_, Cart>(store, keys::CART)
            .await?
            .unwrap_or_default();

        Ok(Self { customer, cart })
    }

    /// Write the state back to a store.
    ///
    /// The customer key is removed when there is no customer.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it cannot be written.
    pub async fn save<S: KeyValueStore>(&self, store: &S) -> Result<(), S::Error> {
        save_json(store, keys::CART, &self.cart).await?;

        match &self.customer {
            Some(customer) => save_json(store, keys::CUSTOMER, customer).await,
            None => store.remove(keys::CUSTOMER).await,
        }
    }
}

/// Whether the visitor has passed the admin login.
///
/// # Errors
///
/// Returns the store's error if it cannot be read.
pub async fn is_admin<S: KeyValueStore>(store: &S) -> Result<bool, S::Error> {
    Ok(store.get(keys::ADMIN).await?.is_some_and(|v| !v.is_empty()))
}

/// Mark the visitor as an admin.
///
/// # Errors
///
/// Returns the store's error if it cannot be written.
pub async fn grant_admin<S: KeyValueStore>(store: &S) -> Result<(), S::Error> {
    store.set(keys::ADMIN, ADMIN_FLAG.to_owned()).await
}

/// Clear the admin flag (logout).
///
/// # Errors
///
/// Returns the store's error if it cannot be written.
pub async fn revoke_admin<S: KeyValueStore>(store: &S) -> Result<(), S::Error> {
    store.remove(keys::ADMIN).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ItemId;

    #[tokio::test]
    async fn test_load_empty_store() {
        let store = MemoryStore::new();
        let state = ShopState::load(&store).await.unwrap();
        assert_eq!(state, ShopState::default());
    }

    #[tokio::test]
    async fn test_malformed_cart_is_empty() {
        let store = MemoryStore::new();
        store.set(keys::CART, "{not json".to_string()).await.unwrap();
        store
            .set(keys::CUSTOMER, r#"{"name":"Ravi","number":"1"}"#.to_string())
            .await
            .unwrap();

        let state = ShopState::load(&store).await.unwrap();
        assert!(state.cart.is_empty());
        assert_eq!(state.customer.unwrap().name, "Ravi");
    }

    #[tokio::test]
    async fn test_malformed_customer_is_absent() {
        let store = MemoryStore::new();
        store.set(keys::CUSTOMER, "[]".to_string()).await.unwrap();

        let state = ShopState::load(&store).await.unwrap();
        assert!(state.customer.is_none());
    }

    #[tokio::test]
    async fn test_null_blobs_are_absent() {
        let store = MemoryStore::new();
        store.set(keys::CUSTOMER, "null".to_string()).await.unwrap();
        store.set(keys::CART, "null".to_string()).await.unwrap();

        let state = ShopState::load(&store).await.unwrap();
        assert_eq!(state, ShopState::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        let mut state = ShopState {
            customer: Some(Customer::parse("Ravi", "98450").unwrap()),
            ..ShopState::default()
        };
        state.cart.increment(&ItemId::from("b"));
        state.cart.set_quantity(&ItemId::from("a"), 2);
        state.save(&store).await.unwrap();

        assert_eq!(
            store.get(keys::CART).await.unwrap().as_deref(),
            Some(r#"{"b":1,"a":2}"#)
        );
        assert_eq!(ShopState::load(&store).await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_save_without_customer_removes_key() {
        let store = MemoryStore::new();
        store
            .set(keys::CUSTOMER, r#"{"name":"Ravi","number":"1"}"#.to_string())
            .await
            .unwrap();

        ShopState::default().save(&store).await.unwrap();
        assert!(store.get(keys::CUSTOMER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_admin_flag() {
        let store = MemoryStore::new();
        assert!(!is_admin(&store).await.unwrap());

        grant_admin(&store).await.unwrap();
        assert!(is_admin(&store).await.unwrap());

        revoke_admin(&store).await.unwrap();
        assert!(!is_admin(&store).await.unwrap());
    }
}
