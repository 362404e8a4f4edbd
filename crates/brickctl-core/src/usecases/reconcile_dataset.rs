//! Dataset reconciliation use case
//!
//! Drives a dataset toward a declared state (present with given properties,
//! or absent) against the dataset store, sending only the properties that
//! actually differ and classifying what happened.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::outcome::paths_value;
use crate::domain::{
    to_wire_map, DatasetPath, DefaultProfile, DomainError, FailureKind, PropertyMap,
    PropertyModel, ReconciliationOutcome,
};
use crate::ports::{IDatasetStore, StoreError, StoreErrorKind};

/// Order in which datasets are destroyed during a recursive destroy
///
/// Byte-wise reverse lexicographic: `p01/a/b/c` before `p01/a/b` before
/// `p01/a`, and `p01/a/z` before `p01/a/b`. A descendant always sorts before
/// its ancestors because it extends the ancestor's path.
pub fn destroy_order(a: &DatasetPath, b: &DatasetPath) -> Ordering {
    b.as_str().as_bytes().cmp(a.as_str().as_bytes())
}

/// Properties whose value in `after` differs from `before`, in wire form.
pub(crate) fn changed_properties(before: &PropertyMap, after: &PropertyMap) -> PropertyMap {
    after
        .iter()
        .filter(|(name, value)| before.get(*name) != Some(*value))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Translate a store failure into a failed outcome.
pub(crate) fn store_failure(path: &DatasetPath, err: &StoreError) -> ReconciliationOutcome {
    let kind = match err.kind() {
        StoreErrorKind::InsufficientSpace => FailureKind::Capacity,
        StoreErrorKind::DoesNotExist => FailureKind::Absent,
        StoreErrorKind::Exists | StoreErrorKind::Other => FailureKind::Other,
    };
    ReconciliationOutcome::failed(path.clone(), kind, err.to_string())
}

/// Use case for creating, updating and destroying datasets
///
/// Owns the default profile new datasets are created with and whether a
/// destroy recurses when the caller does not say. Every run re-reads the
/// store; nothing is cached between runs.
pub struct ReconcileDatasetUseCase {
    store: Arc<dyn IDatasetStore + Send + Sync>,
    profile: DefaultProfile,
    recursive_destroy: bool,
}

impl ReconcileDatasetUseCase {
    /// Creates a new ReconcileDatasetUseCase
    ///
    /// # Arguments
    ///
    /// * `store` - Dataset store the reconciliation runs against
    /// * `profile` - Baseline properties for newly created datasets
    pub fn new(store: Arc<dyn IDatasetStore + Send + Sync>, profile: DefaultProfile) -> Self {
        Self {
            store,
            profile,
            recursive_destroy: false,
        }
    }

    /// Creates a use case from the `dataset` section of the configuration
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the configured defaults do not form a
    /// valid profile
    pub fn from_config(
        store: Arc<dyn IDatasetStore + Send + Sync>,
        config: &Config,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(store, config.default_profile()?)
            .with_recursive_destroy(config.dataset.recursive_destroy))
    }

    /// Sets the recursion used by [`ensure_absent_configured`](Self::ensure_absent_configured).
    pub fn with_recursive_destroy(mut self, recursive: bool) -> Self {
        self.recursive_destroy = recursive;
        self
    }

    pub fn profile(&self) -> &DefaultProfile {
        &self.profile
    }

    pub fn recursive_destroy(&self) -> bool {
        self.recursive_destroy
    }

    /// Ensures a dataset exists with the given properties
    ///
    /// This method:
    /// 1. Merges `overlay` onto the default profile (validating every name)
    /// 2. Reads the dataset's observed properties
    /// 3. Creates the dataset with the full merged property set if it does
    ///    not exist, or sends only the overlay entries that differ if it does
    /// 4. Re-reads the properties after an update to decide whether anything
    ///    actually changed
    ///
    /// A create that fails with `Exists` (the dataset appeared between the
    /// read and the create) falls back to the update path.
    ///
    /// # Returns
    ///
    /// `PresentCreated`, `PresentModified` or `PresentUnchanged` on success,
    /// `Failed(Capacity)` when the pool lacks space, `Failed(Other)` otherwise
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the overlay names an unknown property or
    /// carries a value that does not fit; no store call is made in that case
    pub async fn ensure_present(
        &self,
        path: &DatasetPath,
        overlay: &PropertyMap,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let mut model = PropertyModel::from_profile(&self.profile);
        model.merge(overlay)?;
        let desired = desired_overlay(overlay)?;

        let observed = match self.store.get_properties(path).await {
            Ok(observed) => observed,
            Err(StoreError::DoesNotExist(_)) => {
                return Ok(self.create(path, &model, &desired).await);
            }
            Err(err) => {
                warn!(path = %path, error = %err, "Failed to read dataset properties");
                return Ok(store_failure(path, &err));
            }
        };

        Ok(self.update_existing(path, &desired, observed).await)
    }

    /// Updates properties on an existing dataset
    ///
    /// Unlike [`ensure_present`](Self::ensure_present) this never creates
    /// the dataset and never applies the default profile.
    ///
    /// # Returns
    ///
    /// `PresentModified` with `details.updates`, `PresentUnchanged`, or
    /// `Failed(Absent)` with `details.dataset_absent` if there is no such
    /// dataset
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the overlay is invalid
    pub async fn update_properties(
        &self,
        path: &DatasetPath,
        overlay: &PropertyMap,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let desired = desired_overlay(overlay)?;

        let observed = match self.store.get_properties(path).await {
            Ok(observed) => observed,
            Err(StoreError::DoesNotExist(_)) => {
                return Ok(ReconciliationOutcome::failed(
                    path.clone(),
                    FailureKind::Absent,
                    "Unable to obtain current properties because dataset does not exist",
                )
                .with_detail("dataset_absent", true));
            }
            Err(err) => return Ok(store_failure(path, &err)),
        };

        Ok(self.update_existing(path, &desired, observed).await)
    }

    /// Ensures a dataset does not exist, recursing as configured
    ///
    /// # Errors
    ///
    /// See [`ensure_absent`](Self::ensure_absent)
    pub async fn ensure_absent_configured(
        &self,
        path: &DatasetPath,
    ) -> Result<ReconciliationOutcome, DomainError> {
        self.ensure_absent(path, self.recursive_destroy).await
    }

    /// Ensures a dataset does not exist
    ///
    /// Without `recursive`, a dataset with descendants is left in place and
    /// the outcome carries the full descendant list. With `recursive`, the
    /// descendants are destroyed one at a time in [`destroy_order`] before
    /// the dataset itself.
    ///
    /// # Returns
    ///
    /// `Absent` if there was nothing to do, `Destroyed` with
    /// `details.destroyed` listing every removed path in order, or
    /// `Failed(RequiresRecursive)` / `Failed(Other)`
    ///
    /// # Errors
    ///
    /// Never fails with a `DomainError` today; the signature matches the
    /// other operations
    pub async fn ensure_absent(
        &self,
        path: &DatasetPath,
        recursive: bool,
    ) -> Result<ReconciliationOutcome, DomainError> {
        match self.store.dataset_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(path = %path, "Dataset already absent");
                return Ok(ReconciliationOutcome::absent(path.clone()));
            }
            Err(err) => return Ok(store_failure(path, &err)),
        }

        let mut stack = vec![path.clone()];
        let mut destroyed = Vec::new();
        let mut reported: HashMap<DatasetPath, Vec<DatasetPath>> = HashMap::new();

        while let Some(current) = stack.last().cloned() {
            let response = match self.store.destroy_dataset(&current).await {
                Ok(response) => response,
                Err(StoreError::DoesNotExist(_)) if current != *path => {
                    debug!(path = %current, "Descendant already gone");
                    stack.pop();
                    continue;
                }
                Err(err) => {
                    warn!(path = %current, error = %err, "Destroy failed");
                    return Ok(store_failure(path, &err)
                        .with_detail("destroyed", paths_value(&destroyed)));
                }
            };

            if response.is_destroyed() {
                info!(path = %current, "Destroyed dataset");
                stack.pop();
                destroyed.push(current);
                continue;
            }

            let mut descendants = response.descendants;
            descendants.sort_by(destroy_order);

            if !recursive {
                return Ok(ReconciliationOutcome::failed(
                    path.clone(),
                    FailureKind::RequiresRecursive,
                    format!("Cannot destroy dataset {path} without recursion; it has descendants"),
                )
                .with_detail("descendants", paths_value(&descendants)));
            }

            if reported.get(&current) == Some(&descendants) {
                return Ok(ReconciliationOutcome::failed(
                    path.clone(),
                    FailureKind::Other,
                    format!("Descendants of {current} remain after they were destroyed"),
                )
                .with_detail("descendants", paths_value(&descendants))
                .with_detail("destroyed", paths_value(&destroyed)));
            }

            debug!(
                path = %current,
                count = descendants.len(),
                "Destroying descendants first"
            );
            reported.insert(current, descendants.clone());
            // First in destroy order goes on top.
            stack.extend(descendants.into_iter().rev());
        }

        Ok(ReconciliationOutcome::destroyed(path.clone(), &destroyed))
    }

    async fn create(
        &self,
        path: &DatasetPath,
        model: &PropertyModel,
        desired: &PropertyModel,
    ) -> ReconciliationOutcome {
        let properties = model.wire_properties();
        match self.store.create_dataset(path, &properties).await {
            Ok(()) => {
                info!(path = %path, "Created dataset");
                ReconciliationOutcome::created(path.clone(), &properties)
            }
            Err(StoreError::Exists(_)) => {
                debug!(path = %path, "Dataset appeared before create; updating instead");
                match self.store.get_properties(path).await {
                    Ok(observed) => self.update_existing(path, desired, observed).await,
                    Err(err) => store_failure(path, &err),
                }
            }
            Err(err) => {
                warn!(path = %path, error = %err, "Failed to create dataset");
                // DoesNotExist here refers to a missing parent, so it is not
                // reported as Absent.
                let kind = match err.kind() {
                    StoreErrorKind::InsufficientSpace => FailureKind::Capacity,
                    _ => FailureKind::Other,
                };
                ReconciliationOutcome::failed(path.clone(), kind, err.to_string())
            }
        }
    }

    async fn update_existing(
        &self,
        path: &DatasetPath,
        desired: &PropertyModel,
        before: PropertyMap,
    ) -> ReconciliationOutcome {
        let delta = match desired.diff(&before) {
            Ok(delta) => delta,
            Err(err) => {
                return ReconciliationOutcome::failed(
                    path.clone(),
                    FailureKind::Other,
                    err.to_string(),
                )
            }
        };

        if delta.is_empty() {
            debug!(path = %path, "No property changes needed");
            return ReconciliationOutcome::unchanged(path.clone());
        }

        let updates = to_wire_map(&delta);
        debug!(path = %path, count = updates.len(), "Sending property updates");
        if let Err(err) = self.store.set_properties(path, &updates).await {
            warn!(path = %path, error = %err, "Failed to set dataset properties");
            return store_failure(path, &err);
        }

        let after = match self.store.get_properties(path).await {
            Ok(after) => after,
            Err(err) => return store_failure(path, &err),
        };

        let changed = changed_properties(&before, &after);
        if changed.is_empty() {
            ReconciliationOutcome::unchanged(path.clone())
        } else {
            info!(path = %path, count = changed.len(), "Modified dataset properties");
            ReconciliationOutcome::modified(path.clone(), &to_wire_map(&changed))
        }
    }
}

/// Validate and normalize a caller overlay on its own.
fn desired_overlay(overlay: &PropertyMap) -> Result<PropertyModel, DomainError> {
    let mut desired = PropertyModel::empty();
    desired.merge(overlay)?;
    Ok(desired)
}
