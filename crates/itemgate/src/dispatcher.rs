//! Request dispatcher.
//!
//! Classifies every inbound event into exactly one route, runs it against the
//! item store, and always answers with a response envelope. Errors raised while
//! handling a route are caught once, in [`Dispatcher::dispatch`].

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use itemgate_core::body::{decode_body, BodyError};
use itemgate_core::event::{HttpMethod, RequestEvent, Response};
use itemgate_core::expression::compile;
use itemgate_core::storage::{
    repository_error_to_status_code, Cursor, Item, ItemStore, RepositoryError,
};

use crate::config::Config;

/// Errors that can occur while handling a classified request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    MalformedBody(#[from] BodyError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl DispatchError {
    fn status_code(&self) -> u16 {
        match self {
            Self::MalformedBody(_) => 500,
            Self::Store(err) => repository_error_to_status_code(err),
        }
    }
}

/// The outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Health,
    ListItems,
    GetItem(&'a str),
    CreateItem,
    UpdateItem(&'a str),
    DeleteItem(&'a str),
    Unmatched,
}

/// Concrete paths the dispatcher routes on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Paths {
    health: String,
    item: String,
    collection: String,
}

/// Routes request events to item store operations.
pub struct Dispatcher {
    store: Arc<dyn ItemStore>,
    paths: Paths,
    key_param: String,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ItemStore>, config: &Config) -> Self {
        Self {
            store,
            paths: Paths {
                health: config.health_path(),
                item: config.item_path(),
                collection: config.collection_path(),
            },
            key_param: config.key_query_param.clone(),
        }
    }

    /// Classifies an event. First matching arm wins.
    pub fn classify<'a>(&self, event: &'a RequestEvent) -> Route<'a> {
        let path = event.path.as_str();
        let key = event.query_param(&self.key_param);

        match (&event.http_method, key) {
            (HttpMethod::Get, _) if path == self.paths.health => Route::Health,
            (HttpMethod::Get, _) if path == self.paths.collection => Route::ListItems,
            (HttpMethod::Get, Some(key)) if path == self.paths.item => Route::GetItem(key),
            (HttpMethod::Post, _) if path == self.paths.item => Route::CreateItem,
            (HttpMethod::Patch | HttpMethod::Put, Some(key)) if path == self.paths.item => {
                Route::UpdateItem(key)
            }
            (HttpMethod::Delete, Some(key)) if path == self.paths.item => Route::DeleteItem(key),
            _ => Route::Unmatched,
        }
    }

    /// Handles one event. Never fails: every outcome is an envelope.
    #[tracing::instrument(skip_all, fields(method = %event.http_method, path = %event.path))]
    pub async fn dispatch(&self, event: &RequestEvent) -> Response {
        let route = self.classify(event);
        tracing::debug!(?route, "Classified request");

        match self.handle(route, event).await {
            Ok(response) => response,
            Err(err) => {
                let status = err.status_code();
                if status == 404 {
                    tracing::warn!(error = %err, "Item not found");
                    Response::not_found(err.to_string())
                } else {
                    tracing::error!(error = %err, "Request failed");
                    Response::internal_error(format!("Error: {err}"))
                }
            }
        }
    }

    async fn handle(
        &self,
        route: Route<'_>,
        event: &RequestEvent,
    ) -> Result<Response, DispatchError> {
        match route {
            Route::Health => Ok(Response::success(200, "Service is healthy", None)),
            Route::ListItems => self.list_items().await,
            Route::GetItem(key) => self.get_item(key).await,
            Route::CreateItem => self.create_item(event).await,
            Route::UpdateItem(key) => self.update_item(key, event).await,
            Route::DeleteItem(key) => self.delete_item(key).await,
            Route::Unmatched => {
                tracing::warn!("No route matched");
                Ok(Response::not_found(format!("Path {} not found", event.path)))
            }
        }
    }

    async fn list_items(&self) -> Result<Response, DispatchError> {
        let items = self.scan_all().await?;
        tracing::info!(count = items.len(), "Read all items");

        let details = format!("Fetched {} items", items.len());
        let data = Value::Array(items.into_iter().map(Value::Object).collect());
        Ok(Response::success(200, details, Some(data)))
    }

    /// Follows scan cursors until the store reports the last page.
    ///
    /// Pages are requested one after another since each request needs the
    /// cursor returned by the previous one.
    async fn scan_all(&self) -> Result<Vec<Item>, RepositoryError> {
        let mut items = Vec::new();
        let mut cursor: Option<Cursor> = None;

        loop {
            let page = self.store.scan(cursor.as_ref()).await?;
            items.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(items),
            }
        }
    }

    async fn get_item(&self, key: &str) -> Result<Response, DispatchError> {
        match self.store.get_item(key).await? {
            Some(item) => {
                tracing::info!(key, "Read item");
                Ok(Response::success(
                    200,
                    format!("Fetched item with key {key}"),
                    Some(Value::Object(item)),
                ))
            }
            None => {
                tracing::warn!(key, "Item not found");
                Ok(Response::not_found(format!("Item with key {key} not found")))
            }
        }
    }

    async fn create_item(&self, event: &RequestEvent) -> Result<Response, DispatchError> {
        let mut item = decode_body(event.body.as_deref(), event.is_base64_encoded)?;

        let key = Uuid::new_v4().to_string();
        let key_attribute = self.store.key_attribute();
        if let Some(supplied) = item.insert(key_attribute.to_string(), Value::String(key.clone()))
        {
            tracing::warn!(%supplied, "Replaced caller-supplied primary key");
        }

        self.store.put_item(&item).await?;
        tracing::info!(key = %key, "Created item");

        Ok(Response::success(
            201,
            format!("Created item with key {key}"),
            None,
        ))
    }

    async fn update_item(
        &self,
        key: &str,
        event: &RequestEvent,
    ) -> Result<Response, DispatchError> {
        let mut attributes = decode_body(event.body.as_deref(), event.is_base64_encoded)?;

        if attributes.remove(self.store.key_attribute()).is_some() {
            tracing::warn!(key, "Ignored primary key in update body");
        }
        if attributes.is_empty() {
            return Err(BodyError::NoAttributes.into());
        }

        let update = compile(&attributes);
        self.store.update_item(key, &update).await?;
        tracing::info!(key, clauses = update.len(), "Updated item");

        Ok(Response::success(
            200,
            format!("Updated item with key {key}"),
            None,
        ))
    }

    async fn delete_item(&self, key: &str) -> Result<Response, DispatchError> {
        self.store.delete_item(key).await?;
        tracing::info!(key, "Deleted item");

        Ok(Response::success(
            200,
            format!("Deleted item with key {key}"),
            None,
        ))
    }
}
