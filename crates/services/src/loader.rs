//! Dataset loading: stored collection first, seed document otherwise.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use storage::repository::ItemStore;
use study_core::model::{DatasetSelector, ItemRecord};
use url::Url;

use crate::error::LoadError;

/// Relative locations of each dataset's seed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetPaths {
    pub general: String,
    pub weekly: String,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            general: "dadosJuridicos.json".into(),
            weekly: "base/dados.json".into(),
        }
    }
}

impl DatasetPaths {
    /// Defaults, overridden by `STUDY_GENERAL_PATH` / `STUDY_WEEKLY_PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            general: env::var("STUDY_GENERAL_PATH").unwrap_or(defaults.general),
            weekly: env::var("STUDY_WEEKLY_PATH").unwrap_or(defaults.weekly),
        }
    }

    #[must_use]
    pub fn for_selector(&self, selector: DatasetSelector) -> &str {
        match selector {
            DatasetSelector::General => &self.general,
            DatasetSelector::Weekly => &self.weekly,
        }
    }
}

/// Where a dataset's seed document comes from.
#[async_trait]
pub trait SeedSource: Send + Sync {
    /// Human-readable location, shown when loading fails.
    fn location(&self, selector: DatasetSelector) -> String;

    /// Fetch and parse the seed document for `selector`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` for transport failures, non-success status or
    /// documents that are not a JSON array of items.
    async fn fetch(&self, selector: DatasetSelector) -> Result<Vec<ItemRecord>, LoadError>;
}

/// Fetches seed documents over HTTP relative to a base URL.
#[derive(Clone)]
pub struct HttpSeedSource {
    client: Client,
    base: Url,
    paths: DatasetPaths,
}

impl HttpSeedSource {
    /// # Errors
    ///
    /// Returns `LoadError::Location` if `base` is not an absolute URL.
    pub fn new(base: &str, paths: DatasetPaths) -> Result<Self, LoadError> {
        // A base without a trailing slash would drop its last segment on join.
        let base = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        Ok(Self {
            client: Client::new(),
            base,
            paths,
        })
    }

    fn url(&self, selector: DatasetSelector) -> Result<Url, LoadError> {
        Ok(self.base.join(self.paths.for_selector(selector))?)
    }
}

#[async_trait]
impl SeedSource for HttpSeedSource {
    fn location(&self, selector: DatasetSelector) -> String {
        self.url(selector)
            .map_or_else(|_| self.paths.for_selector(selector).to_owned(), |u| u.to_string())
    }

    async fn fetch(&self, selector: DatasetSelector) -> Result<Vec<ItemRecord>, LoadError> {
        let url = self.url(selector)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Reads seed documents from a local directory.
#[derive(Clone, Debug)]
pub struct FileSeedSource {
    root: PathBuf,
    paths: DatasetPaths,
}

impl FileSeedSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, paths: DatasetPaths) -> Self {
        Self {
            root: root.into(),
            paths,
        }
    }

    fn path(&self, selector: DatasetSelector) -> PathBuf {
        self.root.join(self.paths.for_selector(selector))
    }
}

#[async_trait]
impl SeedSource for FileSeedSource {
    fn location(&self, selector: DatasetSelector) -> String {
        self.path(selector).display().to_string()
    }

    async fn fetch(&self, selector: DatasetSelector) -> Result<Vec<ItemRecord>, LoadError> {
        let raw = tokio::fs::read_to_string(self.path(selector)).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Fixed in-memory seed documents, keyed by dataset.
#[derive(Clone, Debug, Default)]
pub struct StaticSeedSource {
    general: Option<Vec<ItemRecord>>,
    weekly: Option<Vec<ItemRecord>>,
}

impl StaticSeedSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, selector: DatasetSelector, records: Vec<ItemRecord>) -> Self {
        match selector {
            DatasetSelector::General => self.general = Some(records),
            DatasetSelector::Weekly => self.weekly = Some(records),
        }
        self
    }
}

#[async_trait]
impl SeedSource for StaticSeedSource {
    fn location(&self, selector: DatasetSelector) -> String {
        format!("static:{}", selector.key())
    }

    async fn fetch(&self, selector: DatasetSelector) -> Result<Vec<ItemRecord>, LoadError> {
        let records = match selector {
            DatasetSelector::General => self.general.clone(),
            DatasetSelector::Weekly => self.weekly.clone(),
        };
        records.ok_or_else(|| {
            LoadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no seed document for {}", selector.key()),
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Read back from the store.
    Stored,
    /// Fetched from the seed source and written to the store.
    Seeded,
    /// Nothing usable; see `LoadOutcome::error`.
    Failed,
}

/// Result of a dataset load. Failures still carry an (empty) item list.
#[derive(Debug)]
pub struct LoadOutcome {
    pub selector: DatasetSelector,
    pub items: Vec<ItemRecord>,
    pub origin: LoadOrigin,
    pub error: Option<LoadError>,
    pub location: String,
}

impl LoadOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Resolves the active dataset into item records.
#[derive(Clone)]
pub struct DatasetLoader {
    store: ItemStore,
    source: Arc<dyn SeedSource>,
}

impl DatasetLoader {
    #[must_use]
    pub fn new(store: ItemStore, source: Arc<dyn SeedSource>) -> Self {
        Self { store, source }
    }

    #[must_use]
    pub fn location(&self, selector: DatasetSelector) -> String {
        self.source.location(selector)
    }

    /// Load `selector` from the store, seeding it from the source when the
    /// stored collection is empty.
    ///
    /// Never retries. A store that cannot be read is reported as a failure
    /// without fetching, so unreadable user data is not overwritten.
    pub async fn load(&self, selector: DatasetSelector) -> LoadOutcome {
        let location = self.source.location(selector);

        match self.store.load_items(selector).await {
            Ok(items) if !items.is_empty() => {
                tracing::debug!(dataset = selector.key(), count = items.len(), "loaded stored items");
                return LoadOutcome {
                    selector,
                    items,
                    origin: LoadOrigin::Stored,
                    error: None,
                    location,
                };
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(dataset = selector.key(), %err, "stored items unreadable");
                return Self::failed(selector, location, err.into());
            }
        }

        tracing::info!(dataset = selector.key(), %location, "store empty, fetching seed document");
        match self.source.fetch(selector).await {
            Ok(items) => {
                if let Err(err) = self.store.save_items(selector, &items).await {
                    tracing::warn!(dataset = selector.key(), %err, "could not persist seeded items");
                }
                tracing::info!(dataset = selector.key(), count = items.len(), "seeded items");
                LoadOutcome {
                    selector,
                    items,
                    origin: LoadOrigin::Seeded,
                    error: None,
                    location,
                }
            }
            Err(err) => {
                tracing::warn!(dataset = selector.key(), %location, %err, "seed fetch failed");
                Self::failed(selector, location, err)
            }
        }
    }

    fn failed(selector: DatasetSelector, location: String, error: LoadError) -> LoadOutcome {
        LoadOutcome {
            selector,
            items: Vec::new(),
            origin: LoadOrigin::Failed,
            error: Some(error),
            location,
        }
    }
}
