//! Error types for access lists and share descriptors

use brickctl_core::domain::DomainError;
use thiserror::Error;

/// Errors that can occur while parsing access lists or building shares
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetAclError {
    /// Malformed token, loopback host, bad CIDR, or a cross-list conflict
    #[error("{0}")]
    InvalidAddressSpecification(String),

    /// Option value outside its legal set
    #[error("Invalid value for {option} option: {value}")]
    InvalidOption { option: String, value: String },

    /// Option value of the wrong type
    #[error("Invalid type for {option} option: {value}")]
    InvalidOptionType { option: String, value: String },

    /// Share settings the appliance could not take as one argument
    #[error("{0}")]
    InvalidShareSetting(String),
}

impl NetAclError {
    pub(crate) fn address(message: impl Into<String>) -> Self {
        NetAclError::InvalidAddressSpecification(message.into())
    }
}

impl From<DomainError> for NetAclError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidOption { option, value } => {
                NetAclError::InvalidOption { option, value }
            }
            DomainError::InvalidOptionType { option, value } => {
                NetAclError::InvalidOptionType { option, value }
            }
            DomainError::ValidationFailed(message) => NetAclError::InvalidShareSetting(message),
            other => NetAclError::InvalidShareSetting(other.to_string()),
        }
    }
}

impl From<NetAclError> for DomainError {
    fn from(err: NetAclError) -> Self {
        match err {
            NetAclError::InvalidOption { option, value } => {
                DomainError::InvalidOption { option, value }
            }
            NetAclError::InvalidOptionType { option, value } => {
                DomainError::InvalidOptionType { option, value }
            }
            NetAclError::InvalidAddressSpecification(message)
            | NetAclError::InvalidShareSetting(message) => DomainError::ValidationFailed(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_errors_survive_conversion() {
        let err: NetAclError = DomainError::invalid_option("csc", "bogus").into();
        assert_eq!(err.to_string(), "Invalid value for csc option: bogus");

        let back: DomainError = err.into();
        assert_eq!(back, DomainError::invalid_option("csc", "bogus"));
    }

    #[test]
    fn test_address_errors_become_validation_failures() {
        let err = NetAclError::address("Local address 127.0.0.1 not allowed");
        let domain: DomainError = err.into();
        assert_eq!(
            domain.to_string(),
            "Validation failed: Local address 127.0.0.1 not allowed"
        );
    }
}
