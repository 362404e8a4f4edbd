//! SMB share descriptor
//!
//! SMB has no root concept, so only read-only, read/write and denied lists
//! are carried alongside the share name and protocol options.

use std::fmt::{self, Display, Formatter};

use brickctl_core::config::ShareConfig;
use brickctl_core::domain::{
    CachingMode, DatasetPath, EncryptionMode, ShareOverlay, ShareProtocol, WireProperties,
    MONITORING_PROPERTY,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::conflict::ConflictValidator;
use crate::error::NetAclError;
use crate::list::AddressList;
use crate::nfs::on_off;
use crate::params;

/// A validated SMB share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmbShare {
    name: String,
    access_based_enumeration: bool,
    caching: CachingMode,
    encryption: EncryptionMode,
    read_only: AddressList,
    read_write: AddressList,
    none: AddressList,
    monitoring: bool,
}

impl SmbShare {
    /// Start a share named after the last component of `dataset`.
    #[must_use]
    pub fn builder(dataset: &DatasetPath) -> SmbShareBuilder {
        SmbShareBuilder::new(dataset)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn caching(&self) -> CachingMode {
        self.caching
    }

    #[must_use]
    pub fn encryption(&self) -> EncryptionMode {
        self.encryption
    }

    #[must_use]
    pub fn read_only(&self) -> &AddressList {
        &self.read_only
    }

    #[must_use]
    pub fn read_write(&self) -> &AddressList {
        &self.read_write
    }

    #[must_use]
    pub fn none(&self) -> &AddressList {
        &self.none
    }

    #[must_use]
    pub fn monitoring(&self) -> bool {
        self.monitoring
    }

    /// The `sharesmb` property value.
    #[must_use]
    pub fn share_value(&self) -> String {
        let mut clauses = vec![
            format!("name={}", self.name),
            format!("abe={}", self.access_based_enumeration),
            format!("csc={}", self.caching),
            format!("encrypt={}", self.encryption),
        ];
        for (key, list) in [
            ("ro", &self.read_only),
            ("rw", &self.read_write),
            ("none", &self.none),
        ] {
            if list.has_entries() {
                clauses.push(format!("{key}={list}"));
            }
        }
        clauses.join(",")
    }

    #[must_use]
    pub fn property_pairs(&self) -> WireProperties {
        let mut pairs = WireProperties::new();
        pairs.insert(
            ShareProtocol::Smb.property_name().to_string(),
            self.share_value(),
        );
        pairs.insert(
            MONITORING_PROPERTY.to_string(),
            on_off(self.monitoring).to_string(),
        );
        pairs
    }

    /// Convert into an overlay the share use case can apply.
    ///
    /// # Errors
    /// Returns `InvalidShareSetting` if the share name contains whitespace.
    pub fn into_overlay(self) -> Result<ShareOverlay, NetAclError> {
        Ok(ShareOverlay::new(
            ShareProtocol::Smb,
            self.share_value(),
            self.monitoring,
        )?)
    }
}

impl Display for SmbShare {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} {MONITORING_PROPERTY}={}",
            ShareProtocol::Smb.property_name(),
            self.share_value(),
            on_off(self.monitoring)
        )
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SmbShare`]
#[derive(Debug, Clone)]
pub struct SmbShareBuilder {
    name: String,
    access_based_enumeration: bool,
    caching: CachingMode,
    encryption: EncryptionMode,
    read_only: String,
    read_write: String,
    none: String,
    monitoring: bool,
}

impl SmbShareBuilder {
    #[must_use]
    pub fn new(dataset: &DatasetPath) -> Self {
        Self {
            name: dataset.name().to_string(),
            access_based_enumeration: false,
            caching: CachingMode::default(),
            encryption: EncryptionMode::default(),
            read_only: String::new(),
            read_write: String::new(),
            none: String::new(),
            monitoring: true,
        }
    }

    #[must_use]
    pub fn from_config(dataset: &DatasetPath, config: &ShareConfig) -> Self {
        Self::new(dataset)
            .access_based_enumeration(config.abe)
            .caching(config.csc)
            .encryption(config.encrypt)
            .monitoring(config.monitoring)
    }

    /// Start from the configured defaults and apply a parameter object.
    ///
    /// Recognized keys: `share_name`, `csc`, `encrypt` (strings), `abe`,
    /// `ub` (booleans) and the `ro_access_list`, `rw_access_list`,
    /// `no_access_list` access lists.
    ///
    /// # Errors
    /// Returns `InvalidOptionType` for a value of the wrong JSON type and
    /// `InvalidOption` for an out-of-set caching or encryption mode.
    pub fn from_params(
        dataset: &DatasetPath,
        params: &Map<String, Value>,
        config: &ShareConfig,
    ) -> Result<Self, NetAclError> {
        let mut builder = Self::from_config(dataset, config);

        if let Some(name) = params::text(params, "share_name", "share_name")? {
            builder = builder.name(name);
        }
        if let Some(abe) = params::flag(params, "abe", "abe")? {
            builder = builder.access_based_enumeration(abe);
        }
        if let Some(csc) = params::text(params, "csc", "csc")? {
            builder = builder.caching(csc.parse()?);
        }
        if let Some(encrypt) = params::text(params, "encrypt", "encrypt")? {
            builder = builder.encryption(encrypt.parse()?);
        }
        if let Some(ub) = params::flag(params, "ub", MONITORING_PROPERTY)? {
            builder = builder.monitoring(ub);
        }

        if let Some(list) = params::access_list(params, "ro_access_list")? {
            builder = builder.read_only(list);
        }
        if let Some(list) = params::access_list(params, "rw_access_list")? {
            builder = builder.read_write(list);
        }
        if let Some(list) = params::access_list(params, "no_access_list")? {
            builder = builder.none(list);
        }

        Ok(builder)
    }

    /// Override the share name. An empty name keeps the dataset-derived one.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.name = name;
        }
        self
    }

    pub fn access_based_enumeration(mut self, enabled: bool) -> Self {
        self.access_based_enumeration = enabled;
        self
    }

    pub fn caching(mut self, mode: CachingMode) -> Self {
        self.caching = mode;
        self
    }

    pub fn encryption(mut self, mode: EncryptionMode) -> Self {
        self.encryption = mode;
        self
    }

    pub fn read_only(mut self, list: impl Into<String>) -> Self {
        self.read_only = list.into();
        self
    }

    pub fn read_write(mut self, list: impl Into<String>) -> Self {
        self.read_write = list.into();
        self
    }

    pub fn none(mut self, list: impl Into<String>) -> Self {
        self.none = list.into();
        self
    }

    pub fn monitoring(mut self, enabled: bool) -> Self {
        self.monitoring = enabled;
        self
    }

    /// Parse the access lists and validate them.
    ///
    /// # Errors
    /// Returns `InvalidShareSetting` for a share name that would break out
    /// of its `name=` clause, and `InvalidAddressSpecification` for a bad
    /// token in any list or a conflict between the read-only and read/write
    /// lists.
    pub fn build(self) -> Result<SmbShare, NetAclError> {
        if self
            .name
            .chars()
            .any(|c| c == ',' || c == '=' || c.is_whitespace())
        {
            return Err(NetAclError::InvalidShareSetting(format!(
                "Invalid share name {}: separators and whitespace are not allowed",
                self.name
            )));
        }

        let share = SmbShare {
            name: self.name,
            access_based_enumeration: self.access_based_enumeration,
            caching: self.caching,
            encryption: self.encryption,
            read_only: AddressList::parse(&self.read_only)?,
            read_write: AddressList::parse(&self.read_write)?,
            none: AddressList::parse(&self.none)?,
            monitoring: self.monitoring,
        };
        ConflictValidator::validate(&share.read_only, &share.read_write)?;

        debug!(name = %share.name, csc = %share.caching, encrypt = %share.encryption, "Built SMB share");
        Ok(share)
    }
}
