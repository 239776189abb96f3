//! DynamoDB repository implementation.
//!
//! Implements [`ItemStore`] from `itemgate_core::storage` using DynamoDB.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use itemgate_core::expression::UpdateExpression;
use itemgate_core::storage::{Cursor, Item, ItemStore, RepositoryError, Result, ScanPage};

use super::conversions::{attributes_to_item, item_to_attributes, json_to_attribute};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_scan_error,
    map_update_item_error,
};

/// DynamoDB-based repository implementation.
///
/// The client is built once per process and shared by every request.
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
    key_attribute: String,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        key_attribute: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            key_attribute: key_attribute.into(),
        }
    }

    /// Creates a new repository using the AWS SDK default credential chain.
    pub async fn from_env(table_name: impl Into<String>, key_attribute: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        Self::new(client, table_name, key_attribute)
    }

    fn key(&self, key: &str) -> (String, AttributeValue) {
        (self.key_attribute.clone(), AttributeValue::S(key.to_string()))
    }
}

/// Picks the `#name` alias the key condition should use.
///
/// Reuses the alias of the key attribute when the update already has one,
/// otherwise finds a free one.
fn key_alias(names: &BTreeMap<String, String>, key_attribute: &str) -> String {
    if let Some((alias, _)) = names.iter().find(|(_, name)| name.as_str() == key_attribute) {
        return alias.clone();
    }
    let mut alias = "#pk".to_string();
    let mut suffix = 1;
    while names.contains_key(&alias) {
        alias = format!("#pk_{suffix}");
        suffix += 1;
    }
    alias
}

#[async_trait]
impl ItemStore for DynamoDbRepository {
    fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    async fn get_item(&self, key: &str) -> Result<Option<Item>> {
        let (name, value) = self.key(key);
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(name, value)
            .send()
            .await
            .map_err(map_get_item_error)?;

        tracing::info!(table = %self.table_name, key, "Read item");

        match result.item {
            Some(item) => Ok(Some(attributes_to_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn put_item(&self, item: &Item) -> Result<()> {
        let id = item
            .get(&self.key_attribute)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                RepositoryError::InvalidData(format!(
                    "Item is missing string key attribute '{}'",
                    self.key_attribute
                ))
            })?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(item)))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", &self.key_attribute)
            .send()
            .await
            .map_err(|e| map_put_item_error(e, id))?;

        tracing::info!(table = %self.table_name, key = id, "Created item");
        Ok(())
    }

    async fn update_item(&self, key: &str, update: &UpdateExpression) -> Result<()> {
        if update.is_empty() {
            return Err(RepositoryError::InvalidData(
                "Update expression has no clauses".to_string(),
            ));
        }

        let aliased = update.aliased();
        let pk_alias = key_alias(&aliased.names, &self.key_attribute);
        let (name, value) = self.key(key);

        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(name, value)
            .update_expression(&aliased.expression)
            .condition_expression(format!("attribute_exists({pk_alias})"))
            .expression_attribute_names(pk_alias, &self.key_attribute);
        for (alias, name) in &aliased.names {
            request = request.expression_attribute_names(alias, name);
        }
        for (placeholder, value) in &aliased.values {
            request = request.expression_attribute_values(placeholder, json_to_attribute(value));
        }

        request
            .send()
            .await
            .map_err(|e| map_update_item_error(e, key))?;

        tracing::info!(
            table = %self.table_name,
            key,
            expression = %aliased.expression,
            "Updated item"
        );
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> Result<()> {
        let (name, value) = self.key(key);
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(name, value)
            .send()
            .await
            .map_err(map_delete_item_error)?;

        tracing::info!(table = %self.table_name, key, "Deleted item");
        Ok(())
    }

    async fn scan(&self, cursor: Option<&Cursor>) -> Result<ScanPage> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_exclusive_start_key(cursor.map(|c| item_to_attributes(c.last_evaluated_key())))
            .send()
            .await
            .map_err(map_scan_error)?;

        let items = result
            .items
            .unwrap_or_default()
            .iter()
            .map(attributes_to_item)
            .collect::<Result<Vec<_>>>()?;
        let next_cursor = result
            .last_evaluated_key
            .map(|key| attributes_to_item(&key).map(Cursor::new))
            .transpose()?;

        tracing::info!(
            table = %self.table_name,
            count = items.len(),
            more = next_cursor.is_some(),
            "Scanned page"
        );

        Ok(ScanPage { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(alias, name)| (alias.to_string(), name.to_string()))
            .collect()
    }

    #[test]
    fn test_key_alias_defaults_to_pk() {
        assert_eq!(key_alias(&names(&[("#qty", "qty")]), "pid"), "#pk");
    }

    #[test]
    fn test_key_alias_avoids_collisions() {
        let taken = names(&[("#pk", "pk"), ("#pk_1", "pk-1")]);
        assert_eq!(key_alias(&taken, "pid"), "#pk_2");
    }

    #[test]
    fn test_key_alias_reuses_existing_alias() {
        assert_eq!(key_alias(&names(&[("#pid", "pid")]), "pid"), "#pid");
    }
}
