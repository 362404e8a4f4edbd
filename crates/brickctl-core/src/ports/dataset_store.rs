//! Dataset store port (driven/secondary port)
//!
//! This module defines the boundary to the appliance's dataset service:
//! reading and writing properties, creating and destroying datasets.
//!
//! ## Design Notes
//!
//! - Unlike most adapter failures, store errors are classified
//!   ([`StoreError`]) because the reconciliation state machine branches on
//!   them: a create that hits `Exists` falls back to an update, a capacity
//!   failure is reported distinctly.
//! - Every call is a single attempt. Retries and timeouts belong to the
//!   adapter's transport.
//! - Property maps are passed by reference; adapters copy what they keep.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DatasetPath, PropertyMap, WireProperties};

// ============================================================================
// StoreError
// ============================================================================

/// Errors reported by a dataset store
///
/// Each variant carries the store's own message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The dataset does not exist
    #[error("{0}")]
    DoesNotExist(String),

    /// The dataset already exists
    #[error("{0}")]
    Exists(String),

    /// A reservation or quota exceeds the pool's available space
    #[error("{0}")]
    InsufficientSpace(String),

    /// Any other failure, carrying the store's message
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    DoesNotExist,
    Exists,
    InsufficientSpace,
    Other,
}

impl StoreError {
    #[must_use]
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::DoesNotExist(_) => StoreErrorKind::DoesNotExist,
            StoreError::Exists(_) => StoreErrorKind::Exists,
            StoreError::InsufficientSpace(_) => StoreErrorKind::InsufficientSpace,
            StoreError::Other(_) => StoreErrorKind::Other,
        }
    }

    /// Classify a raw error message from the appliance.
    ///
    /// The appliance reports failures as free text; the three conditions the
    /// reconciliation cares about are recognized by their fixed phrases.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("dataset does not exist") {
            StoreError::DoesNotExist(message)
        } else if message.contains("dataset already exists") {
            StoreError::Exists(message)
        } else if message.contains("size is greater than available space") {
            StoreError::InsufficientSpace(message)
        } else {
            StoreError::Other(message)
        }
    }
}

// ============================================================================
// DestroyResponse
// ============================================================================

/// Result of a single, non-recursive destroy request
///
/// An empty descendant list means the dataset was destroyed. A non-empty one
/// means the store refused because those datasets live beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyResponse {
    pub descendants: Vec<DatasetPath>,
}

impl DestroyResponse {
    /// The dataset is gone.
    #[must_use]
    pub fn destroyed() -> Self {
        Self::default()
    }

    /// The dataset was kept because of `descendants`.
    #[must_use]
    pub fn blocked_by(descendants: Vec<DatasetPath>) -> Self {
        Self { descendants }
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.descendants.is_empty()
    }
}

// ============================================================================
// IDatasetStore trait
// ============================================================================

/// Port trait for the appliance dataset service
///
/// ## Implementation Notes
///
/// - `get_properties` returns normalized, registered properties only; use
///   [`crate::domain::parse_property_listing`] when the transport yields the
///   appliance's tab-separated listing.
/// - `destroy_dataset` never recurses. Descendant handling and ordering are
///   the caller's job.
#[async_trait::async_trait]
pub trait IDatasetStore: Send + Sync {
    /// Reads the observed properties of a dataset
    ///
    /// Fails with [`StoreError::DoesNotExist`] if there is no such dataset.
    async fn get_properties(&self, path: &DatasetPath) -> Result<PropertyMap, StoreError>;

    /// Sets the given properties on an existing dataset
    async fn set_properties(
        &self,
        path: &DatasetPath,
        properties: &WireProperties,
    ) -> Result<(), StoreError>;

    /// Creates a dataset with an explicit property set
    ///
    /// Fails with [`StoreError::Exists`] if the dataset is already there.
    async fn create_dataset(
        &self,
        path: &DatasetPath,
        properties: &WireProperties,
    ) -> Result<(), StoreError>;

    /// Destroys a dataset, or reports the descendants preventing it
    async fn destroy_dataset(&self, path: &DatasetPath) -> Result<DestroyResponse, StoreError>;

    /// Returns true if the dataset exists
    async fn dataset_exists(&self, path: &DatasetPath) -> Result<bool, StoreError>;
}
