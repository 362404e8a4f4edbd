//! Share protocols, protocol options and share overlays
//!
//! The option enums are shared by configuration and by the share descriptor
//! builders; parsing an out-of-set value yields `InvalidOption` naming the
//! option as the appliance knows it (`sec`, `csc`, `encrypt`).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::property::{PropertyMap, PropertyValue};

/// Property carrying the user-behavior monitoring flag.
pub const MONITORING_PROPERTY: &str = "racktop:ub";

/// Properties a share reconciliation reads and writes.
pub const SHARE_PROPERTIES: &[&str] = &["sharenfs", "sharesmb", MONITORING_PROPERTY];

/// File-sharing protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareProtocol {
    Nfs,
    Smb,
}

impl ShareProtocol {
    /// Dataset property holding this protocol's share settings.
    #[must_use]
    pub fn property_name(&self) -> &'static str {
        match self {
            ShareProtocol::Nfs => "sharenfs",
            ShareProtocol::Smb => "sharesmb",
        }
    }
}

impl Display for ShareProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ShareProtocol::Nfs => write!(f, "nfs"),
            ShareProtocol::Smb => write!(f, "smb"),
        }
    }
}

impl FromStr for ShareProtocol {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nfs" => Ok(ShareProtocol::Nfs),
            "smb" => Ok(ShareProtocol::Smb),
            other => Err(DomainError::invalid_option("protocol", other)),
        }
    }
}

/// Generates the string conversions for an option enum whose variants map
/// one-to-one onto appliance tokens.
macro_rules! option_enum {
    ($ty:ident, $option:literal, { $($variant:ident => $token:literal),+ $(,)? }) => {
        impl $ty {
            /// Every legal value, in appliance order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $token),+
                }
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($ty::$variant),)+
                    other => Err(DomainError::invalid_option($option, other)),
                }
            }
        }
    };
}

/// NFS security flavor (`sec=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMode {
    #[default]
    Sys,
    Dh,
    #[serde(rename = "none")]
    Unauthenticated,
    Krb5,
    Krb5i,
    Krb5p,
}

option_enum!(SecurityMode, "sec", {
    Sys => "sys",
    Dh => "dh",
    Unauthenticated => "none",
    Krb5 => "krb5",
    Krb5i => "krb5i",
    Krb5p => "krb5p",
});

/// SMB client-side caching policy (`csc=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachingMode {
    Manual,
    Auto,
    Vdo,
    #[default]
    Disabled,
}

option_enum!(CachingMode, "csc", {
    Manual => "manual",
    Auto => "auto",
    Vdo => "vdo",
    Disabled => "disabled",
});

/// SMB encryption requirement (`encrypt=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionMode {
    Enabled,
    Disabled,
    #[default]
    Required,
}

option_enum!(EncryptionMode, "encrypt", {
    Enabled => "enabled",
    Disabled => "disabled",
    Required => "required",
});

/// A validated set of share property changes for one protocol
///
/// Produced by the share descriptor builders after their access lists passed
/// conflict validation, or by [`ShareOverlay::disabled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOverlay {
    protocol: ShareProtocol,
    properties: PropertyMap,
}

impl ShareOverlay {
    /// Overlay enabling a share with the given settings string.
    ///
    /// # Errors
    /// Returns `ValidationFailed` if `settings` is empty or contains
    /// whitespace; the appliance receives it as a single `key=value`
    /// argument.
    pub fn new(
        protocol: ShareProtocol,
        settings: impl Into<String>,
        monitoring: bool,
    ) -> Result<Self, DomainError> {
        let settings = settings.into();
        if settings.is_empty() {
            return Err(DomainError::ValidationFailed(
                "share settings must not be empty".to_string(),
            ));
        }
        if settings.chars().any(char::is_whitespace) {
            return Err(DomainError::ValidationFailed(
                "share settings must not contain whitespace characters".to_string(),
            ));
        }

        let mut properties = PropertyMap::new();
        properties.insert(
            protocol.property_name().to_string(),
            PropertyValue::Text(settings),
        );
        properties.insert(MONITORING_PROPERTY.to_string(), monitoring.into());
        Ok(Self {
            protocol,
            properties,
        })
    }

    /// Overlay turning a protocol's share off.
    #[must_use]
    pub fn disabled(protocol: ShareProtocol) -> Self {
        let mut properties = PropertyMap::new();
        properties.insert(protocol.property_name().to_string(), false.into());
        Self {
            protocol,
            properties,
        }
    }

    #[must_use]
    pub fn protocol(&self) -> ShareProtocol {
        self.protocol
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}
