//! Share configuration use case
//!
//! Applies a validated [`ShareOverlay`] to an existing dataset. Only the
//! share-related properties are observed and compared, so unrelated property
//! drift never shows up as a share change.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::reconcile_dataset::{changed_properties, store_failure};
use crate::domain::outcome::properties_value;
use crate::domain::{
    to_wire_map, DatasetPath, DomainError, FailureKind, PropertyMap, PropertyModel,
    ReconciliationOutcome, ShareOverlay, ShareProtocol, SHARE_PROPERTIES,
};
use crate::ports::IDatasetStore;

/// Use case for enabling, changing and disabling NFS/SMB shares
pub struct ConfigureShareUseCase {
    store: Arc<dyn IDatasetStore + Send + Sync>,
}

impl ConfigureShareUseCase {
    /// Creates a new ConfigureShareUseCase
    ///
    /// # Arguments
    ///
    /// * `store` - Dataset store holding the shared datasets
    pub fn new(store: Arc<dyn IDatasetStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Applies share settings to a dataset
    ///
    /// This method:
    /// 1. Validates the overlay's property names and values
    /// 2. Fails with `Failed(Absent)` if the dataset does not exist
    /// 3. Reads the share properties, sends only those that differ
    /// 4. Re-reads them to decide whether the share actually changed
    ///
    /// # Returns
    ///
    /// `PresentModified` or `PresentUnchanged` with `details.before` and
    /// `details.after` holding the observed share properties
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the overlay carries an unregistered
    /// property
    pub async fn apply(
        &self,
        path: &DatasetPath,
        overlay: &ShareOverlay,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let mut desired = PropertyModel::empty();
        desired.merge(overlay.properties())?;

        match self.store.dataset_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(path = %path, protocol = %overlay.protocol(), "Refusing to share absent dataset");
                return Ok(ReconciliationOutcome::failed(
                    path.clone(),
                    FailureKind::Absent,
                    format!("cannot share non-existent dataset {path}"),
                )
                .with_detail("dataset_absent", true));
            }
            Err(err) => return Ok(store_failure(path, &err)),
        }

        let before = match self.observe(path).await {
            Ok(before) => before,
            Err(outcome) => return Ok(outcome),
        };

        let delta = desired.diff(&before)?;
        if delta.is_empty() {
            debug!(path = %path, protocol = %overlay.protocol(), "Share already configured");
            return Ok(ReconciliationOutcome::unchanged(path.clone())
                .with_detail("before", properties_value(&to_wire_map(&before)))
                .with_detail("after", properties_value(&to_wire_map(&before))));
        }

        let updates = to_wire_map(&delta);
        if let Err(err) = self.store.set_properties(path, &updates).await {
            warn!(path = %path, error = %err, "Failed to apply share settings");
            return Ok(store_failure(path, &err));
        }

        let after = match self.observe(path).await {
            Ok(after) => after,
            Err(outcome) => return Ok(outcome),
        };

        let changed = changed_properties(&before, &after);
        let outcome = if changed.is_empty() {
            ReconciliationOutcome::unchanged(path.clone())
        } else {
            info!(path = %path, protocol = %overlay.protocol(), "Updated share settings");
            ReconciliationOutcome::modified(path.clone(), &to_wire_map(&changed))
        };

        Ok(outcome
            .with_detail("before", properties_value(&to_wire_map(&before)))
            .with_detail("after", properties_value(&to_wire_map(&after))))
    }

    /// Turns a protocol's share off
    ///
    /// Disabling a share that is already off is reported as unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply)
    pub async fn disable(
        &self,
        path: &DatasetPath,
        protocol: ShareProtocol,
    ) -> Result<ReconciliationOutcome, DomainError> {
        self.apply(path, &ShareOverlay::disabled(protocol)).await
    }

    /// Observed share properties only.
    async fn observe(&self, path: &DatasetPath) -> Result<PropertyMap, ReconciliationOutcome> {
        let observed = self
            .store
            .get_properties(path)
            .await
            .map_err(|err| store_failure(path, &err))?;
        Ok(observed
            .into_iter()
            .filter(|(name, _)| SHARE_PROPERTIES.contains(&name.as_str()))
            .collect())
    }
}
