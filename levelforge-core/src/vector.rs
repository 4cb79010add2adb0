//! Ordered characteristic vectors.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An ordered mapping from characteristic names to integer values.
///
/// The order is the feature schema's order. Names are fixed once the vector is built;
/// only values change, and only through copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacteristicVector {
    entries: Vec<(String, i64)>,
}

impl CharacteristicVector {
    /// Build a vector from entries already in schema order.
    ///
    /// No schema check happens here; use [`FeatureSchema::validate`](crate::FeatureSchema::validate)
    /// or [`FeatureSchema::vector_from_pairs`](crate::FeatureSchema::vector_from_pairs) at the boundary.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn value(&self, index: usize) -> Option<i64> {
        self.entries.get(index).map(|(_, v)| *v)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(n, _)| n.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> Vec<i64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Numeric model input in schema order.
    pub fn as_features(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v as f64).collect()
    }

    /// Copy of this vector with the value at `index` replaced.
    ///
    /// Returns `None` when `index` is out of bounds.
    pub fn with_value(&self, index: usize, value: i64) -> Option<Self> {
        if index >= self.entries.len() {
            return None;
        }
        let mut next = self.clone();
        next.entries[index].1 = value;
        Some(next)
    }

    /// Copy of this vector with several positions replaced at once.
    pub fn with_values(&self, changes: &[(usize, i64)]) -> Option<Self> {
        let mut next = self.clone();
        for &(index, value) in changes {
            next.entries.get_mut(index)?.1 = value;
        }
        Some(next)
    }

    /// Per-position "differs from `other`" flags.
    ///
    /// Positions missing from `other` count as different.
    pub fn diff_mask(&self, other: &CharacteristicVector) -> Vec<bool> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (_, v))| other.value(i) != Some(*v))
            .collect()
    }

    /// True when both vectors carry the same names in the same order.
    pub fn same_keys(&self, other: &CharacteristicVector) -> bool {
        self.entries.len() == other.entries.len() && self.names().eq(other.names())
    }
}

impl fmt::Display for CharacteristicVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for CharacteristicVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CharacteristicVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = CharacteristicVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of characteristic names to integers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(8));
                while let Some((name, value)) = access.next_entry::<String, i64>()? {
                    entries.push((name, value));
                }
                Ok(CharacteristicVector { entries })
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
