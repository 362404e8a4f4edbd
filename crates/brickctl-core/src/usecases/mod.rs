//! Use cases (interactors) for brickctl
//!
//! This module contains the application use cases that orchestrate
//! domain types and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`ReconcileDatasetUseCase`] - Create, update and destroy datasets
//! - [`ConfigureShareUseCase`] - Enable, change and disable NFS/SMB shares

pub mod configure_share;
pub mod reconcile_dataset;

#[cfg(test)]
mod mock_store;

pub use configure_share::ConfigureShareUseCase;
pub use reconcile_dataset::{destroy_order, ReconcileDatasetUseCase};
