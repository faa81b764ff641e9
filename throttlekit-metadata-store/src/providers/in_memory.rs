use crate::{
    errors::Result,
    store::{KeyValue, MetadataStore},
    watch::{WatchEvent, WatchStream},
    MetadataError,
};

use async_trait::async_trait;
use dashmap::{mapref::one::RefMut, DashMap};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// MemoryStore is an in-memory key-value store that implements the MetadataStore trait.
///
/// Nodes are grouped per root segment (`/brokers`, `/admin`, ...), each group holding
/// the remaining path as key. The store is used by tests and by the binaries, which
/// populate it from a JSON snapshot of the coordination service.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, BTreeMap<String, Value>>>,
    watchers: Arc<DashMap<String, broadcast::Sender<WatchEvent>>>,
}

/// Splits `/root/rest/of/path` into (`/root`, `rest/of/path`). The key part may be empty.
fn split_path(path: &str) -> Result<(String, String)> {
    let trimmed = path
        .strip_prefix('/')
        .ok_or_else(|| {
            MetadataError::InvalidArguments(format!("Path must be absolute: {}", path))
        })?;
    let trimmed = trimmed.trim_end_matches('/');

    let (root, key) = match trimmed.split_once('/') {
        Some((root, key)) => (root, key),
        None => (trimmed, ""),
    };

    if root.is_empty() {
        return Err(MetadataError::InvalidArguments(format!(
            "Path must have a root segment: {}",
            path
        )));
    }

    Ok((format!("/{}", root), key.to_string()))
}

fn full_path(root: &str, key: &str) -> String {
    format!("{}/{}", root, key)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a snapshot file, see [`MemoryStore::load_snapshot`].
    pub fn from_snapshot_file(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new();
        store.load_snapshot_file(path)?;
        Ok(store)
    }

    pub fn load_snapshot_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let snapshot: Value = serde_json::from_str(&content)?;
        self.load_snapshot(&snapshot)
    }

    /// Replaces the store content with `snapshot`, an object of `{"<path>": <value>}`.
    ///
    /// Watchers are notified only for nodes whose value changed or that were removed.
    pub fn load_snapshot(&self, snapshot: &Value) -> Result<()> {
        let Value::Object(entries) = snapshot else {
            return Err(MetadataError::InvalidSnapshot(
                "snapshot must be a JSON object of path to value".to_string(),
            ));
        };

        let mut incoming: BTreeMap<(String, String), &Value> = BTreeMap::new();
        for (path, value) in entries {
            let (root, key) = split_path(path)?;
            if key.is_empty() {
                return Err(MetadataError::InvalidSnapshot(format!(
                    "path must have a key component: {}",
                    path
                )));
            }
            incoming.insert((root, key), value);
        }

        let mut events = Vec::new();

        for mut group in self.inner.iter_mut() {
            let root = group.key().clone();
            group.value_mut().retain(|key, _| {
                let keep = incoming.contains_key(&(root.clone(), key.clone()));
                if !keep {
                    events.push(WatchEvent::Delete {
                        key: full_path(&root, key),
                    });
                }
                keep
            });
        }

        for ((root, key), value) in incoming {
            let mut group = self.inner.entry(root.clone()).or_default();
            if group.get(&key) != Some(value) {
                group.insert(key.clone(), value.clone());
                events.push(WatchEvent::Put {
                    key: full_path(&root, &key),
                    value: value.clone(),
                });
            }
        }

        debug!(changes = events.len(), "loaded metadata snapshot");
        for event in events {
            self.notify_watchers(event);
        }

        Ok(())
    }

    fn notify_watchers(&self, event: WatchEvent) {
        for entry in self.watchers.iter() {
            if event.key().starts_with(entry.key()) {
                let _ = entry.value().send(event.clone());
            }
        }
    }

    fn get_group(&self, root: &str) -> RefMut<'_, String, BTreeMap<String, Value>> {
        self.inner.entry(root.to_owned()).or_default()
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let (root, key) = split_path(path)?;

        Ok(self
            .inner
            .get(&root)
            .and_then(|group| group.get(&key).cloned()))
    }

    async fn get_childrens(&self, path: &str) -> Result<Vec<String>> {
        let (root, key) = split_path(path)?;
        let prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{}/", key)
        };

        let mut children = BTreeSet::new();
        if let Some(group) = self.inner.get(&root) {
            for stored in group.keys() {
                if let Some(rest) = stored.strip_prefix(&prefix) {
                    if let Some(child) = rest.split('/').next().filter(|c| !c.is_empty()) {
                        children.insert(full_path(&root, &format!("{}{}", prefix, child)));
                    }
                }
            }
        }

        Ok(children.into_iter().collect())
    }

    async fn put(&self, path: &str, value: Value) -> Result<()> {
        let (root, key) = split_path(path)?;

        if key.is_empty() {
            return Err(MetadataError::InvalidArguments(format!(
                "Path must have a key component: {}",
                path
            )));
        }

        self.get_group(&root).insert(key.clone(), value.clone());

        self.notify_watchers(WatchEvent::Put {
            key: full_path(&root, &key),
            value,
        });

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let (root, key) = split_path(path)?;

        let removed = self
            .inner
            .get_mut(&root)
            .and_then(|mut group| group.remove(&key));

        if removed.is_some() {
            self.notify_watchers(WatchEvent::Delete {
                key: full_path(&root, &key),
            });
        }

        Ok(())
    }

    async fn watch(&self, prefix: &str) -> Result<WatchStream> {
        let sender = self
            .watchers
            .entry(prefix.to_string())
            .or_insert_with(|| broadcast::channel(256).0);
        Ok(WatchStream::from_broadcast(sender.subscribe()))
    }

    async fn get_bulk(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        let (root, mut key_prefix) = split_path(prefix)?;
        if prefix.ends_with('/') && !key_prefix.is_empty() {
            key_prefix.push('/');
        }

        let mut out = Vec::new();
        if let Some(group) = self.inner.get(&root) {
            for (key, value) in group.iter() {
                if key.starts_with(&key_prefix) {
                    out.push(KeyValue {
                        key: full_path(&root, key),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_path_roots() {
        assert_eq!(
            split_path("/brokers/topics/orders").unwrap(),
            ("/brokers".to_string(), "topics/orders".to_string())
        );
        assert_eq!(
            split_path("/brokers").unwrap(),
            ("/brokers".to_string(), String::new())
        );
        assert!(split_path("brokers/ids").is_err());
        assert!(split_path("/").is_err());
    }

    #[tokio::test]
    async fn children_are_direct_only() {
        let store = MemoryStore::new();
        store.put("/brokers/ids/1", json!({})).await.unwrap();
        store.put("/brokers/ids/2", json!({})).await.unwrap();
        store.put("/brokers/ids/2/extra", json!({})).await.unwrap();
        store.put("/brokers/topics/orders", json!({})).await.unwrap();

        let children = store.get_childrens("/brokers/ids").await.unwrap();
        assert_eq!(children, vec!["/brokers/ids/1", "/brokers/ids/2"]);

        let roots = store.get_childrens("/brokers").await.unwrap();
        assert_eq!(roots, vec!["/brokers/ids", "/brokers/topics"]);
    }

    #[tokio::test]
    async fn snapshot_replaces_content() {
        let store = MemoryStore::new();
        store.put("/brokers/ids/9", json!({"host": "old"})).await.unwrap();

        store
            .load_snapshot(&json!({
                "/brokers/ids/1": {"host": "a"},
                "/admin/reassign_partitions": {"version": 1, "partitions": []}
            }))
            .unwrap();

        assert!(store.get("/brokers/ids/9").await.unwrap().is_none());
        assert_eq!(
            store.get("/brokers/ids/1").await.unwrap(),
            Some(json!({"host": "a"}))
        );
        assert!(store
            .get("/admin/reassign_partitions")
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn snapshot_must_be_object() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.load_snapshot(&json!([1, 2])),
            Err(MetadataError::InvalidSnapshot(_))
        ));
        assert!(matches!(
            store.load_snapshot(&json!({"/brokers": {}})),
            Err(MetadataError::InvalidSnapshot(_))
        ));
    }
}
