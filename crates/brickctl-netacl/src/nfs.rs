//! NFS share descriptor
//!
//! Combines four access lists (read-only, read/write, denied, root) with the
//! NFS export options into the value of the `sharenfs` property, e.g.
//!
//! ```text
//! seclabel,anon=nobody,sec=sys,nohide,ro=@10.0.0.0/8:@1.2.3.4,rw=@5.6.0.0/24,root=@5.6.7.8
//! ```

use std::fmt::{self, Display, Formatter};

use brickctl_core::config::ShareConfig;
use brickctl_core::domain::{
    SecurityMode, ShareOverlay, ShareProtocol, WireProperties, MONITORING_PROPERTY,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::conflict::ConflictValidator;
use crate::error::NetAclError;
use crate::list::AddressList;
use crate::params;

/// Anonymous user mapping applied to every NFS share.
pub const ANONYMOUS_USER: &str = "nobody";

/// A validated NFS share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsShare {
    read_only: AddressList,
    read_write: AddressList,
    none: AddressList,
    root: AddressList,
    security: SecurityMode,
    security_label: bool,
    hide_descendants: bool,
    monitoring: bool,
}

impl NfsShare {
    #[must_use]
    pub fn builder() -> NfsShareBuilder {
        NfsShareBuilder::new()
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
    pub fn root(&self) -> &AddressList {
        &self.root
    }

    #[must_use]
    pub fn security(&self) -> SecurityMode {
        self.security
    }

    #[must_use]
    pub fn monitoring(&self) -> bool {
        self.monitoring
    }

    /// The `sharenfs` property value.
    #[must_use]
    pub fn share_value(&self) -> String {
        let mut clauses = Vec::new();
        if self.security_label {
            clauses.push("seclabel".to_string());
        }
        clauses.push(format!("anon={ANONYMOUS_USER}"));
        clauses.push(format!("sec={}", self.security));
        if !self.hide_descendants {
            clauses.push("nohide".to_string());
        }
        for (key, list) in [
            ("ro", &self.read_only),
            ("rw", &self.read_write),
            ("none", &self.none),
            ("root", &self.root),
        ] {
            if list.has_entries() {
                clauses.push(format!("{key}={list}"));
            }
        }
        clauses.join(",")
    }

    /// Both properties this share sets, in wire form.
    #[must_use]
    pub fn property_pairs(&self) -> WireProperties {
        let mut pairs = WireProperties::new();
        pairs.insert(
            ShareProtocol::Nfs.property_name().to_string(),
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
    /// Returns `InvalidShareSetting` if a name in one of the lists carries
    /// characters the appliance would split on.
    pub fn into_overlay(self) -> Result<ShareOverlay, NetAclError> {
        Ok(ShareOverlay::new(
            ShareProtocol::Nfs,
            self.share_value(),
            self.monitoring,
        )?)
    }
}

impl Display for NfsShare {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} {MONITORING_PROPERTY}={}",
            ShareProtocol::Nfs.property_name(),
            self.share_value(),
            on_off(self.monitoring)
        )
    }
}

pub(crate) fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`NfsShare`]
///
/// Access lists are held as raw strings until [`build`](Self::build), which
/// parses them and checks the read-only and read/write lists for conflicts.
#[derive(Debug, Clone)]
pub struct NfsShareBuilder {
    read_only: String,
    read_write: String,
    none: String,
    root: String,
    security: SecurityMode,
    security_label: bool,
    hide_descendants: bool,
    monitoring: bool,
}

impl Default for NfsShareBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NfsShareBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            read_only: String::new(),
            read_write: String::new(),
            none: String::new(),
            root: String::new(),
            security: SecurityMode::default(),
            security_label: false,
            hide_descendants: false,
            monitoring: true,
        }
    }

    /// Start from the configured share defaults.
    #[must_use]
    pub fn from_config(config: &ShareConfig) -> Self {
        Self::new()
            .security(config.nfs_security)
            .monitoring(config.monitoring)
    }

    /// Start from the configured defaults and apply a parameter object.
    ///
    /// Recognized keys: `ro_access_list`, `rw_access_list`,
    /// `no_access_list`, `root_access_list` (string or array of strings),
    /// `sec` (string), `seclabel`, `hideds` and `ub` (booleans). Options
    /// are checked here; access lists are checked by `build`.
    ///
    /// # Errors
    /// Returns `InvalidOptionType` for a value of the wrong JSON type and
    /// `InvalidOption` for an unknown security mode.
    pub fn from_params(
        params: &Map<String, Value>,
        config: &ShareConfig,
    ) -> Result<Self, NetAclError> {
        let mut builder = Self::from_config(config);

        if let Some(sec) = params::text(params, "sec", "sec")? {
            builder = builder.security(sec.parse()?);
        }
        if let Some(label) = params::flag(params, "seclabel", "seclabel")? {
            builder = builder.security_label(label);
        }
        if let Some(hide) = params::flag(params, "hideds", "hideds")? {
            builder = builder.hide_descendants(hide);
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
        if let Some(list) = params::access_list(params, "root_access_list")? {
            builder = builder.root(list);
        }

        Ok(builder)
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

    pub fn root(mut self, list: impl Into<String>) -> Self {
        self.root = list.into();
        self
    }

    pub fn security(mut self, mode: SecurityMode) -> Self {
        self.security = mode;
        self
    }

    pub fn security_label(mut self, enabled: bool) -> Self {
        self.security_label = enabled;
        self
    }

    /// Hide descendant datasets from clients. When off, `nohide` is emitted.
    pub fn hide_descendants(mut self, hide: bool) -> Self {
        self.hide_descendants = hide;
        self
    }

    pub fn monitoring(mut self, enabled: bool) -> Self {
        self.monitoring = enabled;
        self
    }

    /// Parse the access lists and validate them.
    ///
    /// # Errors
    /// Returns `InvalidAddressSpecification` for a bad token in any list or
    /// a conflict between the read-only and read/write lists.
    pub fn build(self) -> Result<NfsShare, NetAclError> {
        let share = NfsShare {
            read_only: AddressList::parse(&self.read_only)?,
            read_write: AddressList::parse(&self.read_write)?,
            none: AddressList::parse(&self.none)?,
            root: AddressList::parse(&self.root)?,
            security: self.security,
            security_label: self.security_label,
            hide_descendants: self.hide_descendants,
            monitoring: self.monitoring,
        };
        ConflictValidator::validate(&share.read_only, &share.read_write)?;

        debug!(
            sec = %share.security,
            ro = share.read_only.len(),
            rw = share.read_write.len(),
            "Built NFS share"
        );
        Ok(share)
    }
}

impl TryFrom<&Value> for NfsShareBuilder {
    type Error = NetAclError;

    /// Parameters over the built-in share defaults.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(params) => Self::from_params(params, &ShareConfig::default()),
            other => Err(params::wrong_type("nfs", other)),
        }
    }
}
