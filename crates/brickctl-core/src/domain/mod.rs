//! Domain entities and business logic
//!
//! This module contains the core domain types for brickctl:
//! - Dataset path newtype
//! - Property values, the known-property registry and observed-state parsing
//! - The default property profile and the property model (merge / diff)
//! - Share protocols, protocol options and share overlays
//! - Reconciliation outcomes
//! - Domain-specific error types

pub mod errors;
pub mod model;
pub mod newtypes;
pub mod outcome;
pub mod profile;
pub mod property;
pub mod share;

// Re-export commonly used types
pub use errors::DomainError;
pub use model::PropertyModel;
pub use newtypes::*;
pub use outcome::{DatasetState, FailureKind, ReconciliationOutcome};
pub use profile::{DefaultProfile, DEFAULT_STORAGE_PROFILE};
pub use property::{
    is_known_property, parse_property_listing, to_wire_map, PropertyKind, PropertyMap,
    PropertyValue, WireProperties, KNOWN_PROPERTIES,
};
pub use share::{
    CachingMode, EncryptionMode, SecurityMode, ShareOverlay, ShareProtocol, MONITORING_PROPERTY,
    SHARE_PROPERTIES,
};
