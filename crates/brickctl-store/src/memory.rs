//! In-process implementation of IDatasetStore
//!
//! Keeps every dataset's full property set in memory and answers the port
//! the way the appliance does: values are parsed from wire form on the way
//! in, failures carry the appliance's messages (classified through
//! [`StoreError::from_message`]), a destroy of a dataset with children is
//! refused with the list of descendants, and every call is journaled.
//!
//! ## Capacity
//!
//! A store built with [`MemoryDatasetStore::with_capacity`] rejects any
//! quota or reservation larger than the configured number of bytes, both on
//! create and on set.

use std::collections::BTreeMap;

use brickctl_core::domain::property::{property_kind, PropertyKind};
use brickctl_core::domain::{
    parse_property_listing, DatasetPath, PropertyMap, PropertyValue, WireProperties,
};
use brickctl_core::ports::{DestroyResponse, IDatasetStore, StoreError};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// One boundary call served by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetProperties(DatasetPath),
    SetProperties(DatasetPath, WireProperties),
    CreateDataset(DatasetPath, WireProperties),
    DestroyDataset(DatasetPath),
    DatasetExists(DatasetPath),
}

impl StoreCall {
    /// True for calls that can change the store's contents.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreCall::SetProperties(..) | StoreCall::CreateDataset(..) | StoreCall::DestroyDataset(_)
        )
    }
}

/// Dataset store held entirely in memory
///
/// Pool roots are ordinary entries that must be seeded (see
/// [`with_pools`](Self::with_pools)); a dataset can only be created under an
/// existing parent.
pub struct MemoryDatasetStore {
    datasets: RwLock<BTreeMap<DatasetPath, PropertyMap>>,
    journal: Mutex<Vec<StoreCall>>,
    capacity: Option<i64>,
}

impl Default for MemoryDatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatasetStore {
    /// Creates an empty store with no pools and unlimited capacity
    #[must_use]
    pub fn new() -> Self {
        Self {
            datasets: RwLock::new(BTreeMap::new()),
            journal: Mutex::new(Vec::new()),
            capacity: None,
        }
    }

    /// Creates a store containing the named pool roots
    ///
    /// Names that are not valid pool names are skipped.
    #[must_use]
    pub fn with_pools<I, S>(pools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let datasets = pools
            .into_iter()
            .filter_map(|name| DatasetPath::new(name.as_ref()).ok())
            .filter(|path| path.parent().is_none())
            .map(|path| (path, PropertyMap::new()))
            .collect();
        Self {
            datasets: RwLock::new(datasets),
            ..Self::new()
        }
    }

    /// Limit quotas and reservations to `bytes`
    #[must_use]
    pub fn with_capacity(mut self, bytes: i64) -> Self {
        self.capacity = Some(bytes);
        self
    }

    /// Insert or replace a dataset and its properties
    pub async fn insert(&self, path: DatasetPath, properties: PropertyMap) {
        self.datasets.write().await.insert(path, properties);
    }

    /// Seed the store from the appliance's tab-separated property listing
    ///
    /// Lines are grouped by their dataset column; each dataset found is
    /// inserted with its registered properties. Returns the number of
    /// datasets loaded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Other` if a dataset column is not a valid path or
    /// a value cannot be parsed.
    pub async fn load_listing(&self, listing: &str) -> Result<usize, StoreError> {
        let mut grouped: BTreeMap<&str, String> = BTreeMap::new();
        for line in listing.lines() {
            let Some((dataset, _)) = line.split_once('\t') else {
                continue;
            };
            let lines = grouped.entry(dataset).or_default();
            lines.push_str(line);
            lines.push('\n');
        }

        let mut parsed = Vec::with_capacity(grouped.len());
        for (dataset, lines) in grouped {
            let path =
                DatasetPath::new(dataset).map_err(|e| StoreError::Other(e.to_string()))?;
            let properties =
                parse_property_listing(&lines).map_err(|e| StoreError::Other(e.to_string()))?;
            parsed.push((path, properties));
        }

        let count = parsed.len();
        let mut datasets = self.datasets.write().await;
        for (path, properties) in parsed {
            // Parents named only implicitly by the listing still need to exist.
            let mut ancestor = path.parent();
            while let Some(parent) = ancestor {
                ancestor = parent.parent();
                datasets.entry(parent).or_default();
            }
            datasets.insert(path, properties);
        }
        info!(count, "Loaded datasets from property listing");
        Ok(count)
    }

    /// Observed properties of a dataset, bypassing the journal
    pub async fn properties(&self, path: &DatasetPath) -> Option<PropertyMap> {
        self.datasets.read().await.get(path).cloned()
    }

    /// Every dataset path currently held, in path order
    pub async fn paths(&self) -> Vec<DatasetPath> {
        self.datasets.read().await.keys().cloned().collect()
    }

    /// The calls served so far, in order
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.journal.lock().await.clone()
    }

    /// Forget the calls served so far
    pub async fn clear_calls(&self) {
        self.journal.lock().await.clear();
    }

    async fn record(&self, call: StoreCall) {
        self.journal.lock().await.push(call);
    }

    /// Parse wire values and enforce the capacity limit.
    fn parse_wire(
        &self,
        action: &str,
        path: &DatasetPath,
        properties: &WireProperties,
    ) -> Result<PropertyMap, StoreError> {
        let mut parsed = PropertyMap::new();
        for (name, raw) in properties {
            let value = PropertyValue::from_wire(name, raw).map_err(|e| {
                StoreError::from_message(format!("cannot {action} '{path}': {e}"))
            })?;
            if let (Some(limit), PropertyValue::Int(bytes)) = (self.capacity, &value) {
                if property_kind(name) == Some(PropertyKind::Size) && *bytes > limit {
                    return Err(StoreError::from_message(format!(
                        "cannot {action} '{path}': size is greater than available space"
                    )));
                }
            }
            parsed.insert(name.clone(), value);
        }
        Ok(parsed)
    }
}

fn does_not_exist(path: &DatasetPath) -> StoreError {
    StoreError::from_message(format!("cannot open '{path}': dataset does not exist"))
}

#[async_trait::async_trait]
impl IDatasetStore for MemoryDatasetStore {
    async fn get_properties(&self, path: &DatasetPath) -> Result<PropertyMap, StoreError> {
        self.record(StoreCall::GetProperties(path.clone())).await;
        self.datasets
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| does_not_exist(path))
    }

    async fn set_properties(
        &self,
        path: &DatasetPath,
        properties: &WireProperties,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::SetProperties(path.clone(), properties.clone()))
            .await;
        let parsed = self.parse_wire("set property for", path, properties)?;

        let mut datasets = self.datasets.write().await;
        let current = datasets.get_mut(path).ok_or_else(|| does_not_exist(path))?;
        debug!(path = %path, count = parsed.len(), "Setting properties");
        current.extend(parsed);
        Ok(())
    }

    async fn create_dataset(
        &self,
        path: &DatasetPath,
        properties: &WireProperties,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::CreateDataset(path.clone(), properties.clone()))
            .await;

        let mut datasets = self.datasets.write().await;
        if datasets.contains_key(path) {
            return Err(StoreError::from_message(format!(
                "cannot create '{path}': dataset already exists"
            )));
        }
        let Some(parent) = path.parent() else {
            return Err(StoreError::from_message(format!(
                "cannot create '{path}': missing dataset name"
            )));
        };
        if !datasets.contains_key(&parent) {
            return Err(StoreError::from_message(format!(
                "cannot create '{path}': parent dataset does not exist"
            )));
        }

        let parsed = self.parse_wire("create", path, properties)?;
        info!(path = %path, count = parsed.len(), "Created dataset");
        datasets.insert(path.clone(), parsed);
        Ok(())
    }

    async fn destroy_dataset(&self, path: &DatasetPath) -> Result<DestroyResponse, StoreError> {
        self.record(StoreCall::DestroyDataset(path.clone())).await;

        let mut datasets = self.datasets.write().await;
        if !datasets.contains_key(path) {
            return Err(does_not_exist(path));
        }

        let descendants: Vec<DatasetPath> = datasets
            .keys()
            .filter(|candidate| candidate.is_descendant_of(path))
            .cloned()
            .collect();
        if !descendants.is_empty() {
            debug!(path = %path, count = descendants.len(), "Destroy refused; dataset has descendants");
            return Ok(DestroyResponse::blocked_by(descendants));
        }

        datasets.remove(path);
        info!(path = %path, "Destroyed dataset");
        Ok(DestroyResponse::destroyed())
    }

    async fn dataset_exists(&self, path: &DatasetPath) -> Result<bool, StoreError> {
        self.record(StoreCall::DatasetExists(path.clone())).await;
        Ok(self.datasets.read().await.contains_key(path))
    }
}
