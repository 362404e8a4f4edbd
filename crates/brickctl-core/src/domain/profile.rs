//! Default property profile
//!
//! New datasets are created with an explicit, fully specified property set
//! instead of inheriting whatever their parent carries. The profile is an
//! immutable value built once (usually from configuration) and handed to the
//! use cases.

use super::errors::DomainError;
use super::property::{normalize, PropertyMap, PropertyValue};

/// Storage profile recorded on datasets unless overridden.
pub const DEFAULT_STORAGE_PROFILE: &str = "general_filesystem";

/// A complete baseline property mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultProfile {
    properties: PropertyMap,
}

impl DefaultProfile {
    /// The standard appliance profile.
    #[must_use]
    pub fn standard() -> Self {
        use PropertyValue::{Int, Unset};

        let text = |s: &str| PropertyValue::Text(s.to_string());
        let entries: [(&str, PropertyValue); 41] = [
            ("aclinherit", text("passthrough")),
            ("aclmode", text("passthrough")),
            ("atime", text("on")),
            ("canmount", text("on")),
            ("checksum", text("fletcher4")),
            ("compression", text("lz4")),
            ("copies", Int(1)),
            ("devices", text("on")),
            ("exec", text("on")),
            ("filesystem_limit", Unset),
            ("logbias", text("latency")),
            ("nbmand", text("on")),
            ("casesensitivity", text("mixed")),
            ("normalization", Unset),
            ("utf8only", text("off")),
            ("primarycache", text("all")),
            ("quota", Unset),
            ("readonly", text("off")),
            ("recordsize", Int(131_072)),
            ("redundant_metadata", text("all")),
            ("refquota", Unset),
            ("refreservation", Unset),
            ("reservation", Unset),
            ("secondarycache", text("all")),
            ("setuid", text("on")),
            ("snapdir", text("hidden")),
            ("snapshot_limit", Unset),
            ("sync", text("standard")),
            ("vscan", text("off")),
            ("xattr", text("on")),
            ("zoned", text("off")),
            ("racktop:storage_profile", text(DEFAULT_STORAGE_PROFILE)),
            ("racktop:encoded_description", text("")),
            ("smartfolders", text("off")),
            ("racktop:ub", text("on")),
            ("racktop:ub_suspend", text("")),
            ("racktop:ub_thresholds", text("null")),
            ("racktop:ub_trial", text("")),
            ("racktop:version", Int(1)),
            ("sharenfs", text("off")),
            ("sharesmb", text("off")),
        ];

        Self {
            properties: entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Return a copy of this profile with one property overridden.
    ///
    /// # Errors
    /// Returns `UnknownProperty` if `name` is not registered, or
    /// `InvalidPropertyValue` if the value does not fit the property's kind.
    pub fn with(
        mut self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<Self, DomainError> {
        let value = normalize(name, value.into())?;
        self.properties.insert(name.to_string(), value);
        Ok(self)
    }

    /// Apply every override in `overrides`; fails without applying any of
    /// them if one is invalid.
    ///
    /// # Errors
    /// Same as [`DefaultProfile::with`].
    pub fn with_all(mut self, overrides: &PropertyMap) -> Result<Self, DomainError> {
        let normalized = overrides
            .iter()
            .map(|(name, value)| Ok((name.clone(), normalize(name, value.clone())?)))
            .collect::<Result<Vec<_>, DomainError>>()?;
        self.properties.extend(normalized);
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

impl Default for DefaultProfile {
    fn default() -> Self {
        Self::standard()
    }
}
