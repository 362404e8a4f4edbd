//! brickctl Core - Dataset and share reconciliation logic
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `DatasetPath`, `PropertyValue`, `PropertyModel`, `DefaultProfile`,
//!   `ShareOverlay`, `ReconciliationOutcome`
//! - **Use cases** - `ReconcileDatasetUseCase`, `ConfigureShareUseCase`
//! - **Port definitions** - `IDatasetStore`, the boundary to the appliance dataset service
//! - **Configuration** - YAML config with validation and a builder
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain types through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
