//! Domain error types
//!
//! This module defines error types specific to domain operations:
//! property registry violations, malformed dataset paths and share options
//! outside their legal sets.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Property name is not part of the known-property registry
    #[error("Cannot update '{0}'; because it is not a known property name")]
    UnknownProperty(String),

    /// Property value cannot be represented for the property's kind
    #[error("Invalid value for property {name}: {value}")]
    InvalidPropertyValue {
        /// The property name
        name: String,
        /// The offending value
        value: String,
    },

    /// Invalid dataset path format or content
    #[error("Invalid dataset path: {0}")]
    InvalidPath(String),

    /// Option value outside its enumerated legal set
    #[error("Invalid value for {option} option: {value}")]
    InvalidOption {
        /// The option name, e.g. `csc`
        option: String,
        /// The rejected value
        value: String,
    },

    /// Option value of the wrong shape
    #[error("Invalid type for {option} option: {value}")]
    InvalidOptionType {
        /// The option name, e.g. `abe`
        option: String,
        /// The rejected value, rendered for display
        value: String,
    },

    /// Generic validation failure (ACL conflicts, malformed share settings)
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl DomainError {
    /// Shorthand for an [`DomainError::InvalidOption`]
    pub fn invalid_option(option: impl Into<String>, value: impl Into<String>) -> Self {
        DomainError::InvalidOption {
            option: option.into(),
            value: value.into(),
        }
    }

    /// Shorthand for an [`DomainError::InvalidOptionType`]
    pub fn invalid_option_type(option: impl Into<String>, value: impl Into<String>) -> Self {
        DomainError::InvalidOptionType {
            option: option.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::UnknownProperty("bogus".to_string());
        assert_eq!(
            err.to_string(),
            "Cannot update 'bogus'; because it is not a known property name"
        );

        let err = DomainError::invalid_option("encrypt", "bogus");
        assert_eq!(err.to_string(), "Invalid value for encrypt option: bogus");

        let err = DomainError::invalid_option_type("abe", "null");
        assert_eq!(err.to_string(), "Invalid type for abe option: null");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidPath("p01//a".to_string());
        let err2 = DomainError::InvalidPath("p01//a".to_string());
        let err3 = DomainError::InvalidPath("/other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
