//! In-memory mock dataset store shared by the use-case tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{DatasetPath, PropertyMap, PropertyValue, WireProperties};
use crate::ports::{DestroyResponse, IDatasetStore, StoreError};

/// Records every call and keeps datasets in a map
///
/// Failure knobs: `fail_create` makes the next create fail, `race_on_create`
/// makes a dataset appear just as it is created, and `stick` makes destroy
/// report success for a path without removing it.
#[derive(Default)]
pub(crate) struct MockStore {
    datasets: Mutex<BTreeMap<DatasetPath, PropertyMap>>,
    calls: Mutex<Vec<String>>,
    create_error: Mutex<Option<StoreError>>,
    races: Mutex<BTreeMap<DatasetPath, PropertyMap>>,
    stuck: Mutex<BTreeSet<DatasetPath>>,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, path: &DatasetPath, properties: PropertyMap) {
        self.datasets
            .lock()
            .unwrap()
            .insert(path.clone(), properties);
    }

    pub(crate) fn properties(&self, path: &DatasetPath) -> Option<PropertyMap> {
        self.datasets.lock().unwrap().get(path).cloned()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn fail_create(&self, err: StoreError) {
        *self.create_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn race_on_create(&self, path: &DatasetPath, properties: PropertyMap) {
        self.races.lock().unwrap().insert(path.clone(), properties);
    }

    pub(crate) fn stick(&self, path: &DatasetPath) {
        self.stuck.lock().unwrap().insert(path.clone());
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn parse(properties: &WireProperties) -> PropertyMap {
        properties
            .iter()
            .map(|(k, v)| {
                let value = PropertyValue::from_wire(k, v).unwrap();
                (k.clone(), value)
            })
            .collect()
    }

    fn missing(path: &DatasetPath) -> StoreError {
        StoreError::DoesNotExist(format!("cannot open '{path}': dataset does not exist"))
    }
}

#[async_trait]
impl IDatasetStore for MockStore {
    async fn get_properties(&self, path: &DatasetPath) -> Result<PropertyMap, StoreError> {
        self.record(format!("get {path}"));
        self.properties(path).ok_or_else(|| Self::missing(path))
    }

    async fn set_properties(
        &self,
        path: &DatasetPath,
        properties: &WireProperties,
    ) -> Result<(), StoreError> {
        let rendered: Vec<String> = properties.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.record(format!("set {path} {}", rendered.join(",")));

        let mut datasets = self.datasets.lock().unwrap();
        let current = datasets.get_mut(path).ok_or_else(|| Self::missing(path))?;
        current.extend(Self::parse(properties));
        Ok(())
    }

    async fn create_dataset(
        &self,
        path: &DatasetPath,
        properties: &WireProperties,
    ) -> Result<(), StoreError> {
        self.record(format!("create {path}"));

        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        if let Some(raced) = self.races.lock().unwrap().remove(path) {
            self.insert(path, raced);
            return Err(StoreError::Exists(format!(
                "cannot create '{path}': dataset already exists"
            )));
        }

        let mut datasets = self.datasets.lock().unwrap();
        if datasets.contains_key(path) {
            return Err(StoreError::Exists(format!(
                "cannot create '{path}': dataset already exists"
            )));
        }
        datasets.insert(path.clone(), Self::parse(properties));
        Ok(())
    }

    async fn destroy_dataset(&self, path: &DatasetPath) -> Result<DestroyResponse, StoreError> {
        self.record(format!("destroy {path}"));

        if self.stuck.lock().unwrap().contains(path) {
            return Ok(DestroyResponse::destroyed());
        }

        let mut datasets = self.datasets.lock().unwrap();
        if !datasets.contains_key(path) {
            return Err(Self::missing(path));
        }
        let descendants: Vec<DatasetPath> = datasets
            .keys()
            .filter(|p| p.is_descendant_of(path))
            .cloned()
            .collect();
        if !descendants.is_empty() {
            return Ok(DestroyResponse::blocked_by(descendants));
        }
        datasets.remove(path);
        Ok(DestroyResponse::destroyed())
    }

    async fn dataset_exists(&self, path: &DatasetPath) -> Result<bool, StoreError> {
        self.record(format!("exists {path}"));
        Ok(self.datasets.lock().unwrap().contains_key(path))
    }
}
