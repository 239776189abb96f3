//! In-memory repository implementation.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use itemgate_core::expression::UpdateExpression;
use itemgate_core::storage::{Cursor, Item, ItemStore, RepositoryError, Result, ScanPage};

const ENTITY_TYPE: &str = "Item";
const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory storage backend for testing and local development.
///
/// Items live in a `BTreeMap` keyed by primary key, so scans page through
/// them in key order. Data is lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    key_attribute: String,
    page_size: usize,
    items: Arc<RwLock<BTreeMap<String, Item>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new("pid")
    }
}

impl InMemoryRepository {
    /// Creates a new empty repository keyed by `key_attribute`.
    pub fn new(key_attribute: impl Into<String>) -> Self {
        Self {
            key_attribute: key_attribute.into(),
            page_size: DEFAULT_PAGE_SIZE,
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Sets how many items a single scan call returns.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn key_of<'a>(&self, item: &'a Item) -> Result<&'a str> {
        item.get(&self.key_attribute)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RepositoryError::InvalidData(format!(
                    "Item is missing string key attribute '{}'",
                    self.key_attribute
                ))
            })
    }
}

/// Applies every clause of `update` to `item`.
///
/// Dotted paths address nested maps; every parent map must already exist.
fn apply_update(item: &mut Item, update: &UpdateExpression) -> Result<()> {
    for clause in update.clauses() {
        let value = update.value_of(clause).cloned().ok_or_else(|| {
            RepositoryError::QueryFailed(format!(
                "No value bound to placeholder {}",
                clause.placeholder()
            ))
        })?;

        let segments: Vec<&str> = clause.segments().collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| RepositoryError::QueryFailed("Empty attribute path".to_string()))?;

        let mut target = &mut *item;
        for segment in parents {
            target = target
                .get_mut(*segment)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    RepositoryError::QueryFailed(format!(
                        "The document path '{}' is invalid for update",
                        clause.path()
                    ))
                })?;
        }
        target.insert((*last).to_string(), value);
    }
    Ok(())
}

#[async_trait]
impl ItemStore for InMemoryRepository {
    fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    async fn get_item(&self, key: &str) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(key).cloned())
    }

    async fn put_item(&self, item: &Item) -> Result<()> {
        let key = self.key_of(item)?.to_string();
        let mut items = self.items.write().await;
        if items.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: ENTITY_TYPE,
                id: key,
            });
        }
        items.insert(key, item.clone());
        Ok(())
    }

    async fn update_item(&self, key: &str, update: &UpdateExpression) -> Result<()> {
        if update
            .clauses()
            .iter()
            .any(|clause| clause.path() == self.key_attribute)
        {
            return Err(RepositoryError::QueryFailed(format!(
                "Cannot update attribute {}: it is part of the key",
                self.key_attribute
            )));
        }

        let mut items = self.items.write().await;
        let item = items.get_mut(key).ok_or_else(|| RepositoryError::NotFound {
            entity_type: ENTITY_TYPE,
            id: key.to_string(),
        })?;

        // Apply to a copy so a failing clause leaves the stored item untouched.
        let mut updated = item.clone();
        apply_update(&mut updated, update)?;
        *item = updated;
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().await;
        items.remove(key);
        Ok(())
    }

    async fn scan(&self, cursor: Option<&Cursor>) -> Result<ScanPage> {
        let start = match cursor {
            Some(cursor) => Bound::Excluded(self.key_of(cursor.last_evaluated_key())?.to_string()),
            None => Bound::Unbounded,
        };

        let items = self.items.read().await;
        let mut remaining = items.range((start, Bound::Unbounded));
        let page: Vec<Item> = remaining
            .by_ref()
            .take(self.page_size)
            .map(|(_, item)| item.clone())
            .collect();

        if remaining.next().is_none() {
            return Ok(ScanPage::last(page));
        }

        let last_key = match page.last() {
            Some(item) => self.key_of(item)?.to_string(),
            None => return Ok(ScanPage::last(page)),
        };
        let mut last_evaluated_key = Item::new();
        last_evaluated_key.insert(self.key_attribute.clone(), Value::String(last_key));

        Ok(ScanPage::with_cursor(page, Cursor::new(last_evaluated_key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemgate_core::expression::compile;
    use serde_json::json;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            _ => panic!("test item must be an object"),
        }
    }

    async fn seeded(count: usize, page_size: usize) -> InMemoryRepository {
        let repo = InMemoryRepository::new("pid").with_page_size(page_size);
        for i in 0..count {
            repo.put_item(&item(json!({"pid": format!("item-{i}"), "n": i})))
                .await
                .unwrap();
        }
        repo
    }

    // ==================== CRUD Tests ====================

    #[tokio::test]
    async fn test_put_and_get() {
        let repo = InMemoryRepository::default();
        let widget = item(json!({"pid": "abc", "name": "widget", "qty": 3}));

        repo.put_item(&widget).await.unwrap();

        assert_eq!(repo.get_item("abc").await.unwrap(), Some(widget));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let repo = InMemoryRepository::default();
        assert!(repo.get_item("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_without_key_is_invalid() {
        let repo = InMemoryRepository::default();
        let result = repo.put_item(&item(json!({"name": "widget"}))).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_put_duplicate_key() {
        let repo = InMemoryRepository::default();
        let widget = item(json!({"pid": "abc"}));
        repo.put_item(&widget).await.unwrap();

        let result = repo.put_item(&widget).await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_update_sets_attributes() {
        let repo = InMemoryRepository::default();
        repo.put_item(&item(json!({"pid": "abc", "name": "widget", "qty": 3})))
            .await
            .unwrap();

        repo.update_item("abc", &compile(&item(json!({"qty": 5, "color": "red"}))))
            .await
            .unwrap();

        let stored = repo.get_item("abc").await.unwrap().unwrap();
        assert_eq!(
            Value::Object(stored),
            json!({"pid": "abc", "name": "widget", "qty": 5, "color": "red"})
        );
    }

    #[tokio::test]
    async fn test_update_nested_path() {
        let repo = InMemoryRepository::default();
        repo.put_item(&item(json!({"pid": "abc", "dims": {"w": 1, "h": 2}})))
            .await
            .unwrap();

        repo.update_item("abc", &compile(&item(json!({"dims.w": 10}))))
            .await
            .unwrap();

        let stored = repo.get_item("abc").await.unwrap().unwrap();
        assert_eq!(stored["dims"], json!({"w": 10, "h": 2}));
    }

    #[tokio::test]
    async fn test_update_invalid_nested_path_leaves_item_untouched() {
        let repo = InMemoryRepository::default();
        let original = item(json!({"pid": "abc", "qty": 1}));
        repo.put_item(&original).await.unwrap();

        let result = repo
            .update_item("abc", &compile(&item(json!({"qty": 2, "missing.child": 1}))))
            .await;

        assert!(matches!(result, Err(RepositoryError::QueryFailed(_))));
        assert_eq!(repo.get_item("abc").await.unwrap(), Some(original));
    }

    #[tokio::test]
    async fn test_update_nonexistent_is_not_found() {
        let repo = InMemoryRepository::default();

        let result = repo
            .update_item("missing", &compile(&item(json!({"qty": 1}))))
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert!(repo.get_item("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_key_attribute_is_rejected() {
        let repo = InMemoryRepository::default();
        repo.put_item(&item(json!({"pid": "abc"}))).await.unwrap();

        let result = repo
            .update_item("abc", &compile(&item(json!({"pid": "other"}))))
            .await;

        assert!(matches!(result, Err(RepositoryError::QueryFailed(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = InMemoryRepository::default();
        repo.put_item(&item(json!({"pid": "abc"}))).await.unwrap();

        repo.delete_item("abc").await.unwrap();
        repo.delete_item("abc").await.unwrap();

        assert!(repo.get_item("abc").await.unwrap().is_none());
    }

    // ==================== Scan Tests ====================

    #[tokio::test]
    async fn test_scan_empty_table() {
        let repo = InMemoryRepository::default();
        assert_eq!(repo.scan(None).await.unwrap(), ScanPage::default());
    }

    #[tokio::test]
    async fn test_scan_pages_through_all_items() {
        let repo = seeded(5, 2).await;

        let first = repo.scan(None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let second = repo.scan(first.next_cursor.as_ref()).await.unwrap();
        assert_eq!(second.items.len(), 2);
        let third = repo.scan(second.next_cursor.as_ref()).await.unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.next_cursor.is_none());

        let keys: Vec<&str> = first
            .items
            .iter()
            .chain(&second.items)
            .chain(&third.items)
            .map(|item| item["pid"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["item-0", "item-1", "item-2", "item-3", "item-4"]);
    }

    #[tokio::test]
    async fn test_scan_exact_page_has_no_cursor() {
        let repo = seeded(2, 2).await;
        let page = repo.scan(None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_scan_with_foreign_cursor_is_invalid() {
        let repo = seeded(3, 1).await;
        let cursor = Cursor::new(item(json!({"other": "x"})));

        let result = repo.scan(Some(&cursor)).await;

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }
}
