//! Typed key/value parameter sets attached to meshes and materials.

use serde::{Deserialize, Serialize};

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Named texture reference (resolved by the asset system).
    Texture(String),
}

/// Ordered parameter set.
///
/// Keys are unique; [`set`](ParameterCollection::set) replaces an existing
/// value in place so insertion order is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterCollection {
    entries: Vec<(String, ParameterValue)>,
}

impl ParameterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: ParameterValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: ParameterValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether every entry of `self` exists in `other` with an equal value.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }

    /// Order-insensitive equality of two optional parameter sets.
    ///
    /// Two absent sets are equal; an absent set never equals a present one,
    /// even an empty one.
    pub fn equivalent(a: Option<&Self>, b: Option<&Self>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a.is_subset_of(b) && b.is_subset_of(a),
            _ => false,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, ParameterValue)> for ParameterCollection {
    fn from_iter<I: IntoIterator<Item = (K, ParameterValue)>>(iter: I) -> Self {
        let mut collection = Self::new();
        for (k, v) in iter {
            collection.set(k, v);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn params(entries: &[(&str, f32)]) -> ParameterCollection {
        entries
            .iter()
            .map(|&(k, v)| (k, ParameterValue::Float(v)))
            .collect()
    }

    #[test]
    fn set_replaces_in_place() {
        let mut p = params(&[("a", 1.0), ("b", 2.0)]);
        p.set("a", ParameterValue::Int(5));
        assert_eq!(p.len(), 2);
        assert_eq!(p.iter().next(), Some(("a", &ParameterValue::Int(5))));
    }

    #[rstest]
    #[case::same_order(&[("x", 1.0), ("y", 2.0)], &[("x", 1.0), ("y", 2.0)], true)]
    #[case::other_order(&[("x", 1.0), ("y", 2.0)], &[("y", 2.0), ("x", 1.0)], true)]
    #[case::value_differs(&[("x", 1.0)], &[("x", 2.0)], false)]
    #[case::extra_key_left(&[("x", 1.0), ("y", 2.0)], &[("x", 1.0)], false)]
    #[case::extra_key_right(&[("x", 1.0)], &[("x", 1.0), ("y", 2.0)], false)]
    #[case::both_empty(&[], &[], true)]
    fn equivalence_is_bidirectional(
        #[case] a: &[(&str, f32)],
        #[case] b: &[(&str, f32)],
        #[case] expected: bool,
    ) {
        let (a, b) = (params(a), params(b));
        assert_eq!(ParameterCollection::equivalent(Some(&a), Some(&b)), expected);
        assert_eq!(ParameterCollection::equivalent(Some(&b), Some(&a)), expected);
    }

    #[test]
    fn absent_sets() {
        let empty = ParameterCollection::new();
        assert!(ParameterCollection::equivalent(None, None));
        assert!(!ParameterCollection::equivalent(Some(&empty), None));
        assert!(!ParameterCollection::equivalent(None, Some(&empty)));
    }
}
