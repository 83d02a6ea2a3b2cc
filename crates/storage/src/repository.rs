use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::{DatasetSelector, ItemRecord};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Opaque string blobs addressed by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Default namespace prefix for item collections.
pub const DEFAULT_NAMESPACE: &str = "studyApp_data";

/// Key holding the active dataset selector.
pub const SELECTOR_KEY: &str = "current_db_key";

/// Item collections and the active selector on top of a `KeyValueStore`.
///
/// Collections live under `"<namespace>_<selector key>"` as a JSON array of
/// `ItemRecord`; the selector lives under `SELECTOR_KEY`.
#[derive(Clone)]
pub struct ItemStore {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl ItemStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_namespace(kv, DEFAULT_NAMESPACE)
    }

    #[must_use]
    pub fn with_namespace(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn collection_key(&self, selector: DatasetSelector) -> String {
        format!("{}_{}", self.namespace, selector.key())
    }

    /// Load the stored collection for `selector`; a missing key is empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not a
    /// JSON array of items, or backend errors from the store.
    pub async fn load_items(&self, selector: DatasetSelector) -> Result<Vec<ItemRecord>, StorageError> {
        let Some(raw) = self.kv.get(&self.collection_key(selector)).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|err| StorageError::Serialization(err.to_string()))
    }

    /// Overwrite the stored collection for `selector`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn save_items(
        &self,
        selector: DatasetSelector,
        items: &[ItemRecord],
    ) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(items).map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.set(&self.collection_key(selector), &raw).await
    }

    /// Read the persisted selector.
    ///
    /// Unknown values are treated as absent so the caller falls back to
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns backend errors from the store.
    pub async fn load_selector(&self) -> Result<Option<DatasetSelector>, StorageError> {
        let Some(raw) = self.kv.get(SELECTOR_KEY).await? else {
            return Ok(None);
        };
        match raw.parse::<DatasetSelector>() {
            Ok(selector) => Ok(Some(selector)),
            Err(err) => {
                tracing::warn!(%err, "ignoring stored dataset selector");
                Ok(None)
            }
        }
    }

    /// Persist the active selector.
    ///
    /// # Errors
    ///
    /// Returns backend errors from the store.
    pub async fn save_selector(&self, selector: DatasetSelector) -> Result<(), StorageError> {
        self.kv.set(SELECTOR_KEY, selector.key()).await
    }
}

/// Backend handles for the app, swappable behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub items: ItemStore,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_kv(Arc::new(InMemoryStore::new()))
    }

    #[must_use]
    pub fn from_kv(kv: Arc<dyn KeyValueStore>) -> Self {
        let items = ItemStore::new(Arc::clone(&kv));
        Self { kv, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collections_are_namespaced_by_selector() {
        let storage = Storage::in_memory();
        let general = vec![ItemRecord::new("Q", "A")];
        storage
            .items
            .save_items(DatasetSelector::General, &general)
            .await
            .unwrap();

        assert_eq!(
            storage.items.load_items(DatasetSelector::General).await.unwrap(),
            general
        );
        assert!(
            storage
                .items
                .load_items(DatasetSelector::Weekly)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            storage
                .kv
                .get("studyApp_data_juridico")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn selector_round_trips_under_singular_key() {
        let storage = Storage::in_memory();
        assert_eq!(storage.items.load_selector().await.unwrap(), None);

        storage
            .items
            .save_selector(DatasetSelector::Weekly)
            .await
            .unwrap();

        assert_eq!(
            storage.kv.get(SELECTOR_KEY).await.unwrap().as_deref(),
            Some("diario")
        );
        assert_eq!(
            storage.items.load_selector().await.unwrap(),
            Some(DatasetSelector::Weekly)
        );
    }

    #[tokio::test]
    async fn unknown_selector_is_ignored() {
        let storage = Storage::in_memory();
        storage.kv.set(SELECTOR_KEY, "mensal").await.unwrap();
        assert_eq!(storage.items.load_selector().await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_collection_is_a_serialization_error() {
        let storage = Storage::in_memory();
        storage
            .kv
            .set("studyApp_data_diario", "{not json")
            .await
            .unwrap();
        let err = storage
            .items
            .load_items(DatasetSelector::Weekly)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn legacy_records_load() {
        let storage = Storage::in_memory();
        storage
            .kv
            .set(
                "studyApp_data_juridico",
                r#"[{"pergunta":"Q1","resposta":"A1"}]"#,
            )
            .await
            .unwrap();
        let items = storage
            .items
            .load_items(DatasetSelector::General)
            .await
            .unwrap();
        assert_eq!(items, vec![ItemRecord::new("Q1", "A1")]);
    }
}
