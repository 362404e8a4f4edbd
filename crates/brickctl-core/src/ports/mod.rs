//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IDatasetStore`] - Appliance dataset service (properties, create, destroy)

pub mod dataset_store;

pub use dataset_store::{DestroyResponse, IDatasetStore, StoreError, StoreErrorKind};
