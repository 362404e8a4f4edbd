//! Property model: type-normalizing merge and diff against observed state

use super::errors::DomainError;
use super::profile::DefaultProfile;
use super::property::{normalize, to_wire_map, PropertyMap, WireProperties};

/// Desired property state for one dataset
///
/// Built empty, from a [`DefaultProfile`], or seeded from observed remote
/// state, then mutated only through [`PropertyModel::merge`]. Every value held
/// is registered and normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyModel {
    properties: PropertyMap,
}

impl PropertyModel {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start from a complete default profile.
    #[must_use]
    pub fn from_profile(profile: &DefaultProfile) -> Self {
        Self {
            properties: profile.properties().clone(),
        }
    }

    /// Start from observed remote state.
    ///
    /// # Errors
    /// Returns `UnknownProperty` if the observed map carries an unregistered
    /// name.
    pub fn seeded(observed: &PropertyMap) -> Result<Self, DomainError> {
        let mut model = Self::empty();
        model.merge(observed)?;
        Ok(model)
    }

    /// Overlay caller-supplied values.
    ///
    /// Every entry is validated before any is applied, so a failed merge
    /// leaves the model untouched. An explicit `none`/unset on a numeric
    /// property is a request to clear it and is accepted.
    ///
    /// # Errors
    /// Returns `UnknownProperty` for unregistered names and
    /// `InvalidPropertyValue` for values that do not fit the property kind.
    pub fn merge(&mut self, overlay: &PropertyMap) -> Result<(), DomainError> {
        let normalized = overlay
            .iter()
            .map(|(name, value)| Ok((name.clone(), normalize(name, value.clone())?)))
            .collect::<Result<Vec<_>, DomainError>>()?;
        self.properties.extend(normalized);
        Ok(())
    }

    /// Properties whose desired value differs from `observed`.
    ///
    /// A key absent from `observed` counts as differing. Observed values are
    /// normalized before comparison; observed keys the model does not hold
    /// are ignored.
    ///
    /// # Errors
    /// Returns `UnknownProperty` if `observed` carries an unregistered name.
    pub fn diff(&self, observed: &PropertyMap) -> Result<PropertyMap, DomainError> {
        let mut observed_normalized = PropertyMap::new();
        for (name, value) in observed {
            observed_normalized.insert(name.clone(), normalize(name, value.clone())?);
        }

        Ok(self
            .properties
            .iter()
            .filter(|(name, value)| observed_normalized.get(*name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }

    /// The model's properties in wire form. The returned map is an owned
    /// copy, independent of later merges.
    #[must_use]
    pub fn wire_properties(&self) -> WireProperties {
        to_wire_map(&self.properties)
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property::PropertyValue;

    fn map(entries: &[(&str, PropertyValue)]) -> PropertyMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_merge_quota_zero_onto_defaults() {
        let mut model = PropertyModel::from_profile(&DefaultProfile::standard());
        model.merge(&map(&[("quota", "0".into())])).unwrap();
        assert_eq!(model.properties()["quota"], PropertyValue::Unset);
        assert_eq!(model.wire_properties()["quota"], "none");
    }

    #[test]
    fn test_merge_clears_numeric_with_none() {
        let mut model = PropertyModel::from_profile(&DefaultProfile::standard());
        model.merge(&map(&[("recordsize", "none".into())])).unwrap();
        assert_eq!(model.properties()["recordsize"], PropertyValue::Unset);

        model.merge(&map(&[("copies", PropertyValue::Unset)])).unwrap();
        assert_eq!(model.properties()["copies"], PropertyValue::Unset);
    }

    #[test]
    fn test_merge_unknown_leaves_model_untouched() {
        let mut model = PropertyModel::from_profile(&DefaultProfile::standard());
        let before = model.clone();
        let result = model.merge(&map(&[
            ("atime", "off".into()),
            ("not_a_prop", "x".into()),
        ]));

        assert_eq!(
            result,
            Err(DomainError::UnknownProperty("not_a_prop".to_string()))
        );
        assert_eq!(model, before);
    }

    #[test]
    fn test_diff_empty_when_observed_is_superset() {
        let mut model = PropertyModel::empty();
        model
            .merge(&map(&[
                ("compression", "lz4".into()),
                ("readonly", "off".into()),
            ]))
            .unwrap();

        let observed = map(&[
            ("compression", "lz4".into()),
            ("readonly", "off".into()),
            ("atime", "on".into()),
        ]);
        assert!(model.diff(&observed).unwrap().is_empty());
    }

    #[test]
    fn test_diff_returns_exactly_differing_keys() {
        let mut model = PropertyModel::empty();
        model
            .merge(&map(&[
                ("compression", "lz4".into()),
                ("readonly", "on".into()),
                ("quota", "10G".into()),
            ]))
            .unwrap();

        let observed = map(&[
            ("compression", "lz4".into()),
            ("readonly", "off".into()),
        ]);
        let delta = model.diff(&observed).unwrap();

        assert_eq!(
            delta,
            map(&[("readonly", "on".into()), ("quota", "10G".into())])
        );
    }

    #[test]
    fn test_diff_normalizes_observed() {
        let mut model = PropertyModel::empty();
        model
            .merge(&map(&[("quota", PropertyValue::Unset), ("copies", PropertyValue::Int(1))]))
            .unwrap();

        let observed = map(&[("quota", "0".into()), ("copies", "1".into())]);
        assert!(model.diff(&observed).unwrap().is_empty());
    }

    #[test]
    fn test_diff_rejects_unknown_observed() {
        let model = PropertyModel::empty();
        let observed = map(&[("bogus", "x".into())]);
        assert!(matches!(
            model.diff(&observed),
            Err(DomainError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_seeded_then_merge() {
        let observed = map(&[("atime", "on".into()), ("compression", "off".into())]);
        let mut model = PropertyModel::seeded(&observed).unwrap();
        model.merge(&map(&[("compression", "lz4".into())])).unwrap();

        let delta = model.diff(&observed).unwrap();
        assert_eq!(delta, map(&[("compression", "lz4".into())]));
    }

    #[test]
    fn test_wire_properties_is_a_snapshot() {
        let mut model = PropertyModel::empty();
        model.merge(&map(&[("atime", "on".into())])).unwrap();
        let wire = model.wire_properties();
        model.merge(&map(&[("atime", "off".into())])).unwrap();
        assert_eq!(wire["atime"], "on");
    }
}
