use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::watch::WatchStream;

/// A key-value pair returned by bulk queries. `key` is the full path.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// Read the value stored at `path`, `None` when the node does not exist.
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Full paths of the direct children of `path`.
    async fn get_childrens(&self, path: &str) -> Result<Vec<String>>;

    async fn put(&self, path: &str, value: Value) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;

    /// Stream of changes for every path starting with `prefix`.
    async fn watch(&self, prefix: &str) -> Result<WatchStream>;

    /// Retrieve all key-value pairs under a given prefix.
    async fn get_bulk(&self, prefix: &str) -> Result<Vec<KeyValue>>;
}
