use async_trait::async_trait;

use crate::expression::UpdateExpression;

use super::{Cursor, Item, Result, ScanPage};

/// A single-table key-value item store.
///
/// Implementations are constructed once per process and shared across
/// concurrent requests, so they must not hold per-request state.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Name of the primary-key attribute.
    fn key_attribute(&self) -> &str;

    /// Gets an item by its primary key.
    async fn get_item(&self, key: &str) -> Result<Option<Item>>;

    /// Stores a new item. The item must already carry its primary key.
    async fn put_item(&self, item: &Item) -> Result<()>;

    /// Applies a partial update to an existing item.
    ///
    /// Returns `RepositoryError::NotFound` when no item has this key.
    async fn update_item(&self, key: &str, update: &UpdateExpression) -> Result<()>;

    /// Deletes an item. Deleting a missing key is not an error.
    async fn delete_item(&self, key: &str) -> Result<()>;

    /// Reads one page of the full table, starting after `cursor`.
    async fn scan(&self, cursor: Option<&Cursor>) -> Result<ScanPage>;
}
