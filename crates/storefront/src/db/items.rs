//! Catalog repository for the `items` table.

use shopfront_core::{Item, ItemDraft, ItemId};

use crate::supabase::{SupabaseClient, SupabaseError};

const TABLE: &str = "items";
const ID_COLUMN: &str = "id";

/// Repository for catalog items.
pub struct CatalogRepository<'a> {
    client: &'a SupabaseClient,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Fetch the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the request fails.
    pub async fn list(&self) -> Result<Vec<Item>, SupabaseError> {
        self.client.select_all(TABLE).await
    }

    /// Fetch the items with the given IDs. Unknown IDs are simply absent from
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the request fails.
    pub async fn get_many<'i, I>(&self, ids: I) -> Result<Vec<Item>, SupabaseError>
    where
        I: IntoIterator<Item = &'i ItemId>,
    {
        self.client
            .select_in(TABLE, ID_COLUMN, ids.into_iter().map(ItemId::as_str))
            .await
    }

    /// Fetch a single item.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the request fails.
    pub async fn get(&self, id: &ItemId) -> Result<Option<Item>, SupabaseError> {
        let items = self.get_many([id]).await?;
        Ok(items.into_iter().next())
    }

    /// Insert a new item and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the insert is rejected.
    pub async fn create(&self, draft: &ItemDraft) -> Result<Item, SupabaseError> {
        self.client.insert(TABLE, draft).await
    }

    /// Overwrite an item's editable columns and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if the item no longer exists.
    pub async fn update(&self, id: &ItemId, draft: &ItemDraft) -> Result<Item, SupabaseError> {
        self.client
            .update_eq(TABLE, ID_COLUMN, id.as_str(), draft)
            .await
    }

    /// Delete an item. Deleting a missing item succeeds.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the delete is rejected.
    pub async fn delete(&self, id: &ItemId) -> Result<(), SupabaseError> {
        self.client.delete_eq(TABLE, ID_COLUMN, id.as_str()).await
    }

    /// Check that the table is reachable.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the endpoint is unreachable.
    pub async fn ping(&self) -> Result<(), SupabaseError> {
        self.client.ping(TABLE).await
    }
}
