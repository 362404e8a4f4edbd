//! brickctl Store - Dataset store adapters
//!
//! Implementations of the `IDatasetStore` port from `brickctl-core`. They are
//! driven (secondary) adapters in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`MemoryDatasetStore`] - In-process store behaving like the appliance:
//!   full observed property sets, descendant reporting, capacity limits and
//!   the appliance's error messages
//! - [`StoreCall`] - Journal entry for each boundary call the store served
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use brickctl_core::domain::{DatasetPath, DefaultProfile, PropertyMap};
//! use brickctl_core::usecases::ReconcileDatasetUseCase;
//! use brickctl_store::MemoryDatasetStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = Arc::new(MemoryDatasetStore::with_pools(["p01"]));
//! let usecase = ReconcileDatasetUseCase::new(store, DefaultProfile::standard());
//! let outcome = usecase
//!     .ensure_present(&DatasetPath::new("p01/a")?, &PropertyMap::new())
//!     .await?;
//! println!("{}", outcome.summary());
//! # Ok(())
//! # }
//! ```

pub mod memory;

pub use memory::{MemoryDatasetStore, StoreCall};
