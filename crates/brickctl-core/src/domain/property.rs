//! Dataset properties: typed values, the known-property registry and
//! observed-state parsing
//!
//! The appliance round-trips unset numeric settings inconsistently: some come
//! back as the literal `none`, the quota family reports `0`. Values are
//! normalized per property kind so desired and observed state compare like
//! with like.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Mapping of property name to value. Ordering is irrelevant to the model;
/// the BTreeMap keeps wire output deterministic.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Property name to wire string, as handed to the dataset store.
pub type WireProperties = BTreeMap<String, String>;

/// Literal the appliance uses for an unset value.
pub const UNSET_TOKEN: &str = "none";

/// A single property value
///
/// Serializes untagged, so `null`, numbers and strings in YAML/JSON map
/// straight onto `Unset`, `Int` and `Text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// No value; sent to the appliance as `none`
    Unset,
    /// Integer value
    Int(i64),
    /// Opaque string value
    Text(String),
}

impl PropertyValue {
    /// Render for transmission: `none`, decimal, or the text unchanged.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            PropertyValue::Unset => UNSET_TOKEN.to_string(),
            PropertyValue::Int(n) => n.to_string(),
            PropertyValue::Text(s) => s.clone(),
        }
    }

    /// Parse one observed wire value for the named property.
    ///
    /// # Errors
    /// Returns `UnknownProperty` for unregistered names and
    /// `InvalidPropertyValue` for negative numeric values.
    pub fn from_wire(name: &str, raw: &str) -> Result<Self, DomainError> {
        normalize(name, PropertyValue::Text(raw.to_string()))
    }

    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, PropertyValue::Unset)
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Int(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Text(if b { "on" } else { "off" }.to_string())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Unset, Into::into)
    }
}

/// How a registered property's values are normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Opaque string; integers are carried as their decimal text
    Text,
    /// Count-like value; numeric text becomes `Int`
    Integer,
    /// Space limit; `0` means unset, numeric text becomes `Int`, suffixed
    /// sizes such as `10G` stay text
    Size,
}

/// Registry entry for a recognized property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: PropertyKind,
}

const fn def(name: &'static str, kind: PropertyKind) -> PropertyDef {
    PropertyDef { name, kind }
}

/// Every property name the model will merge, diff or send.
pub const KNOWN_PROPERTIES: &[PropertyDef] = &[
    def("aclinherit", PropertyKind::Text),
    def("aclmode", PropertyKind::Text),
    def("atime", PropertyKind::Text),
    def("canmount", PropertyKind::Text),
    def("checksum", PropertyKind::Text),
    def("compression", PropertyKind::Text),
    def("copies", PropertyKind::Integer),
    def("devices", PropertyKind::Text),
    def("exec", PropertyKind::Text),
    def("filesystem_limit", PropertyKind::Integer),
    def("logbias", PropertyKind::Text),
    def("nbmand", PropertyKind::Text),
    def("casesensitivity", PropertyKind::Text),
    def("normalization", PropertyKind::Text),
    def("utf8only", PropertyKind::Text),
    def("primarycache", PropertyKind::Text),
    def("quota", PropertyKind::Size),
    def("readonly", PropertyKind::Text),
    def("recordsize", PropertyKind::Integer),
    def("redundant_metadata", PropertyKind::Text),
    def("refquota", PropertyKind::Size),
    def("refreservation", PropertyKind::Size),
    def("reservation", PropertyKind::Size),
    def("secondarycache", PropertyKind::Text),
    def("setuid", PropertyKind::Text),
    def("snapdir", PropertyKind::Text),
    def("snapshot_limit", PropertyKind::Integer),
    def("sync", PropertyKind::Text),
    def("vscan", PropertyKind::Text),
    def("xattr", PropertyKind::Text),
    def("zoned", PropertyKind::Text),
    def("racktop:storage_profile", PropertyKind::Text),
    def("racktop:encoded_description", PropertyKind::Text),
    def("smartfolders", PropertyKind::Text),
    def("racktop:ub", PropertyKind::Text),
    def("racktop:ub_suspend", PropertyKind::Text),
    def("racktop:ub_thresholds", PropertyKind::Text),
    def("racktop:ub_trial", PropertyKind::Text),
    def("racktop:version", PropertyKind::Integer),
    def("sharenfs", PropertyKind::Text),
    def("sharesmb", PropertyKind::Text),
];

/// Look up a property's kind, `None` if the name is not registered.
#[must_use]
pub fn property_kind(name: &str) -> Option<PropertyKind> {
    KNOWN_PROPERTIES
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.kind)
}

#[must_use]
pub fn is_known_property(name: &str) -> bool {
    property_kind(name).is_some()
}

/// Normalize a value for the named property.
///
/// `none` is unset for every property. `Size` properties treat `0` as unset,
/// matching the appliance's "0 = unlimited" convention.
///
/// # Errors
/// Returns `UnknownProperty` for unregistered names and
/// `InvalidPropertyValue` for negative numeric values on numeric kinds.
pub fn normalize(name: &str, value: PropertyValue) -> Result<PropertyValue, DomainError> {
    let kind = property_kind(name).ok_or_else(|| DomainError::UnknownProperty(name.to_string()))?;

    let value = match value {
        PropertyValue::Text(s) if s == UNSET_TOKEN => return Ok(PropertyValue::Unset),
        other => other,
    };

    match kind {
        PropertyKind::Text => Ok(match value {
            PropertyValue::Int(n) => PropertyValue::Text(n.to_string()),
            other => other,
        }),
        PropertyKind::Integer | PropertyKind::Size => {
            let numeric = match &value {
                PropertyValue::Int(n) => Some(*n),
                PropertyValue::Text(s) => s.parse::<i64>().ok(),
                PropertyValue::Unset => None,
            };
            match numeric {
                Some(n) if n < 0 => Err(DomainError::InvalidPropertyValue {
                    name: name.to_string(),
                    value: n.to_string(),
                }),
                Some(0) if kind == PropertyKind::Size => Ok(PropertyValue::Unset),
                Some(n) => Ok(PropertyValue::Int(n)),
                None => Ok(value),
            }
        }
    }
}

/// Render a property map in wire form.
#[must_use]
pub fn to_wire_map(properties: &PropertyMap) -> WireProperties {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), value.to_wire()))
        .collect()
}

/// Parse the appliance's tab-separated property listing
/// (`dataset\tproperty\tvalue\tsource`, one property per line) into an
/// observed property map.
///
/// Blank and short lines are skipped, as are properties outside the registry
/// (the listing also carries read-only statistics nothing here manages).
///
/// # Errors
/// Returns `InvalidPropertyValue` if a registered numeric property carries a
/// negative value.
pub fn parse_property_listing(listing: &str) -> Result<PropertyMap, DomainError> {
    let mut properties = PropertyMap::new();
    for line in listing.lines() {
        let mut fields = line.split('\t');
        let (Some(_dataset), Some(name), Some(raw)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if !is_known_property(name) {
            continue;
        }
        properties.insert(name.to_string(), PropertyValue::from_wire(name, raw)?);
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_complete_and_unique() {
        assert_eq!(KNOWN_PROPERTIES.len(), 41);
        let mut names: Vec<_> = KNOWN_PROPERTIES.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), KNOWN_PROPERTIES.len());
        assert!(is_known_property("racktop:ub"));
        assert!(!is_known_property("used"));
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(PropertyValue::Unset.to_wire(), "none");
        assert_eq!(PropertyValue::Int(131072).to_wire(), "131072");
        assert_eq!(PropertyValue::from("lz4").to_wire(), "lz4");
    }

    #[test]
    fn test_quota_zero_means_unset() {
        assert_eq!(
            normalize("quota", "0".into()).unwrap(),
            PropertyValue::Unset
        );
        assert_eq!(
            normalize("refreservation", PropertyValue::Int(0)).unwrap(),
            PropertyValue::Unset
        );
        assert_eq!(
            normalize("quota", "1073741824".into()).unwrap(),
            PropertyValue::Int(1_073_741_824)
        );
        assert_eq!(
            normalize("quota", "10G".into()).unwrap(),
            PropertyValue::from("10G")
        );
    }

    #[test]
    fn test_zero_is_kept_for_integer_kind() {
        assert_eq!(
            normalize("snapshot_limit", "0".into()).unwrap(),
            PropertyValue::Int(0)
        );
    }

    #[test]
    fn test_none_is_unset_everywhere() {
        assert_eq!(
            normalize("normalization", "none".into()).unwrap(),
            PropertyValue::Unset
        );
        assert_eq!(
            normalize("recordsize", "none".into()).unwrap(),
            PropertyValue::Unset
        );
    }

    #[test]
    fn test_text_kind_stringifies_integers() {
        assert_eq!(
            normalize("racktop:ub_thresholds", PropertyValue::Int(5)).unwrap(),
            PropertyValue::from("5")
        );
    }

    #[test]
    fn test_normalize_rejects_unknown_and_negative() {
        assert_eq!(
            normalize("bogus", "on".into()),
            Err(DomainError::UnknownProperty("bogus".to_string()))
        );
        assert!(matches!(
            normalize("copies", PropertyValue::Int(-1)),
            Err(DomainError::InvalidPropertyValue { .. })
        ));
    }

    #[test]
    fn test_serde_untagged() {
        let values: Vec<PropertyValue> = serde_json::from_str(r#"[null, 3, "on"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                PropertyValue::Unset,
                PropertyValue::Int(3),
                PropertyValue::from("on")
            ]
        );
        assert_eq!(serde_json::to_string(&PropertyValue::Unset).unwrap(), "null");
    }

    #[test]
    fn test_parse_property_listing() {
        let listing = "p01/a\tcompression\tlz4\tlocal\n\
                       p01/a\tquota\t0\tdefault\n\
                       p01/a\trecordsize\t131072\tdefault\n\
                       p01/a\tused\t24576\t-\n\
                       p01/a\tnormalization\tnone\tdefault\n\
                       \n\
                       garbage\n";
        let props = parse_property_listing(listing).unwrap();

        assert_eq!(props.len(), 4);
        assert_eq!(props["compression"], PropertyValue::from("lz4"));
        assert_eq!(props["quota"], PropertyValue::Unset);
        assert_eq!(props["recordsize"], PropertyValue::Int(131072));
        assert_eq!(props["normalization"], PropertyValue::Unset);
        assert!(!props.contains_key("used"));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(PropertyValue::from(None::<i64>), PropertyValue::Unset);
        assert_eq!(PropertyValue::from(Some(2_i64)), PropertyValue::Int(2));
        assert_eq!(PropertyValue::from(true), PropertyValue::from("on"));
    }
}
