use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table name (default: "product-inventory")
    pub table_name: String,
    /// Primary-key attribute of every item (default: "pid")
    pub key_attribute: String,
    /// Query parameter carrying the primary key (default: "product_id")
    pub key_query_param: String,
    /// Prefix shared by every route (default: "/api/v1/product-inventory")
    pub base_path: String,
    /// Path segment for single-item operations (default: "product")
    pub item_resource: String,
    /// Path segment for listing all items (default: "products")
    pub collection_resource: String,
    /// Items per scan page for the in-memory store (default: 100)
    pub scan_page_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TABLE_NAME` - DynamoDB table name (default: "product-inventory")
    /// - `KEY_ATTRIBUTE` - Primary-key attribute (default: "pid")
    /// - `KEY_QUERY_PARAM` - Query parameter holding the key (default: "product_id")
    /// - `BASE_PATH` - Route prefix (default: "/api/v1/product-inventory")
    /// - `ITEM_RESOURCE` - Single-item path segment (default: "product")
    /// - `COLLECTION_RESOURCE` - Listing path segment (default: "products")
    /// - `SCAN_PAGE_SIZE` - In-memory scan page size (default: 100)
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("TABLE_NAME").unwrap_or_else(|_| "product-inventory".to_string()),
            key_attribute: env::var("KEY_ATTRIBUTE").unwrap_or_else(|_| "pid".to_string()),
            key_query_param: env::var("KEY_QUERY_PARAM")
                .unwrap_or_else(|_| "product_id".to_string()),
            base_path: env::var("BASE_PATH")
                .unwrap_or_else(|_| "/api/v1/product-inventory".to_string()),
            item_resource: env::var("ITEM_RESOURCE").unwrap_or_else(|_| "product".to_string()),
            collection_resource: env::var("COLLECTION_RESOURCE")
                .unwrap_or_else(|_| "products".to_string()),
            scan_page_size: env::var("SCAN_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(100),
        }
    }

    /// `GET` on this path answers the health check.
    pub fn health_path(&self) -> String {
        self.join("health")
    }

    /// Path for get, create, update and delete of a single item.
    pub fn item_path(&self) -> String {
        self.join(&self.item_resource)
    }

    /// Path for listing every item.
    pub fn collection_path(&self) -> String {
        self.join(&self.collection_resource)
    }

    fn join(&self, segment: &str) -> String {
        format!(
            "{}/{}",
            self.base_path.trim_end_matches('/'),
            segment.trim_start_matches('/')
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
