//! Feature schema: the fixed, ordered set of creature characteristics.

use crate::error::{SchemaError, VectorError};
use crate::vector::CharacteristicVector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Semantic category of a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacteristicKind {
    AbilityModifier,
    ArmorClass,
    HitPoints,
    Perception,
    Save,
}

/// Expected effect of raising a characteristic on the predicted level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    #[default]
    Increasing,
    Decreasing,
    Unknown,
}

/// Hard validity limits for a characteristic, independent of any dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl ValueDomain {
    pub const UNBOUNDED: ValueDomain = ValueDomain {
        min: None,
        max: None,
    };

    pub const fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|m| value >= m) && self.max.is_none_or(|m| value <= m)
    }

    /// Intersect `[lo, hi]` with this domain.
    pub fn restrict(&self, lo: i64, hi: i64) -> (i64, i64) {
        let lo = self.min.map_or(lo, |m| lo.max(m));
        let hi = self.max.map_or(hi, |m| hi.min(m));
        (lo, hi)
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => write!(f, "[{lo}, {hi}]"),
            (Some(lo), None) => write!(f, ">= {lo}"),
            (None, Some(hi)) => write!(f, "<= {hi}"),
            (None, None) => f.write_str("any integer"),
        }
    }
}

/// One named creature attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub name: String,
    pub kind: CharacteristicKind,
    #[serde(default)]
    pub domain: ValueDomain,
    #[serde(default)]
    pub trend: Trend,
}

impl Characteristic {
    pub fn new(name: &str, kind: CharacteristicKind) -> Self {
        let domain = match kind {
            CharacteristicKind::ArmorClass => ValueDomain::at_least(0),
            CharacteristicKind::HitPoints => ValueDomain::at_least(1),
            _ => ValueDomain::UNBOUNDED,
        };
        Self {
            name: name.to_string(),
            kind,
            domain,
            trend: Trend::Increasing,
        }
    }

    pub fn with_domain(mut self, domain: ValueDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }
}

const ABILITIES: [&str; 6] = ["str", "dex", "con", "int", "wis", "cha"];
const SAVES: [&str; 3] = ["fortitude", "reflex", "will"];

/// The ordered list of characteristics a model consumes.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Characteristic>", into = "Vec<Characteristic>")]
pub struct FeatureSchema {
    characteristics: Vec<Characteristic>,
}

impl FeatureSchema {
    pub fn new(characteristics: Vec<Characteristic>) -> Result<Self, SchemaError> {
        if characteristics.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::new();
        for c in &characteristics {
            if !seen.insert(c.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    name: c.name.clone(),
                });
            }
            if let (Some(min), Some(max)) = (c.domain.min, c.domain.max) {
                if min > max {
                    return Err(SchemaError::EmptyDomain {
                        name: c.name.clone(),
                        min,
                        max,
                    });
                }
            }
        }
        Ok(Self { characteristics })
    }

    /// Ability modifiers, armor class and hit points.
    pub fn core() -> Self {
        Self {
            characteristics: Self::core_characteristics(),
        }
    }

    /// The core characteristics plus perception and the three saving throws.
    pub fn extended() -> Self {
        let mut characteristics = Self::core_characteristics();
        characteristics.push(Characteristic::new(
            "perception",
            CharacteristicKind::Perception,
        ));
        characteristics.extend(
            SAVES
                .iter()
                .map(|name| Characteristic::new(name, CharacteristicKind::Save)),
        );
        Self { characteristics }
    }

    fn core_characteristics() -> Vec<Characteristic> {
        let mut characteristics: Vec<Characteristic> = ABILITIES
            .iter()
            .map(|name| Characteristic::new(name, CharacteristicKind::AbilityModifier))
            .collect();
        characteristics.push(Characteristic::new("ac", CharacteristicKind::ArmorClass));
        characteristics.push(Characteristic::new("hp", CharacteristicKind::HitPoints));
        characteristics
    }

    pub fn len(&self) -> usize {
        self.characteristics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characteristics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Characteristic> {
        self.characteristics.iter()
    }

    pub fn characteristic(&self, index: usize) -> Option<&Characteristic> {
        self.characteristics.get(index)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characteristics.iter().map(|c| c.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.characteristics.iter().position(|c| c.name == name)
    }

    /// Check that `vector` carries exactly this schema's characteristics, in order,
    /// with every value inside its domain.
    pub fn validate(&self, vector: &CharacteristicVector) -> Result<(), VectorError> {
        for (position, (c, (name, value))) in self.characteristics.iter().zip(vector.iter()).enumerate() {
            if c.name != name {
                if self.position(name).is_none() {
                    return Err(VectorError::Unknown {
                        name: name.to_string(),
                    });
                }
                return Err(VectorError::OutOfOrder {
                    position,
                    expected: c.name.clone(),
                    found: name.to_string(),
                });
            }
            if !c.domain.contains(value) {
                return Err(VectorError::OutOfDomain {
                    name: c.name.clone(),
                    value,
                    domain: c.domain.to_string(),
                });
            }
        }
        if vector.len() != self.len() {
            if vector.len() < self.len() {
                return Err(VectorError::Missing {
                    name: self.characteristics[vector.len()].name.clone(),
                });
            }
            return Err(VectorError::LengthMismatch {
                expected: self.len(),
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Arrange an unordered name/value mapping into schema order and validate it.
    pub fn vector_from_pairs<I, S>(&self, pairs: I) -> Result<CharacteristicVector, VectorError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut slots: Vec<Option<i64>> = vec![None; self.len()];
        for (name, value) in pairs {
            let name = name.as_ref();
            let index = self.position(name).ok_or_else(|| VectorError::Unknown {
                name: name.to_string(),
            })?;
            if slots[index].replace(value).is_some() {
                return Err(VectorError::Duplicate {
                    name: name.to_string(),
                });
            }
        }
        let mut entries = Vec::with_capacity(self.len());
        for (c, slot) in self.characteristics.iter().zip(slots) {
            let value = slot.ok_or_else(|| VectorError::Missing {
                name: c.name.clone(),
            })?;
            entries.push((c.name.clone(), value));
        }
        let vector = CharacteristicVector::from_entries(entries);
        self.validate(&vector)?;
        Ok(vector)
    }

    /// Parse a JSON object such as `{"str": 7, "dex": 2, ...}` into a schema-ordered vector.
    ///
    /// Floats with no fractional part (`7.0`) are accepted; anything else non-integral is not.
    pub fn vector_from_json(
        &self,
        value: &serde_json::Value,
    ) -> Result<CharacteristicVector, VectorError> {
        let object = value.as_object().ok_or(VectorError::NotAnObject)?;
        let mut pairs = Vec::with_capacity(object.len());
        for (name, raw) in object {
            pairs.push((name.as_str(), json_integer(name, raw)?));
        }
        self.vector_from_pairs(pairs)
    }
}

fn json_integer(name: &str, raw: &serde_json::Value) -> Result<i64, VectorError> {
    let not_integral = || VectorError::NotIntegral {
        name: name.to_string(),
        value: raw.to_string(),
    };
    if let Some(v) = raw.as_i64() {
        return Ok(v);
    }
    match raw.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(not_integral()),
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::core()
    }
}

impl TryFrom<Vec<Characteristic>> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(characteristics: Vec<Characteristic>) -> Result<Self, Self::Error> {
        Self::new(characteristics)
    }
}

impl From<FeatureSchema> for Vec<Characteristic> {
    fn from(schema: FeatureSchema) -> Self {
        schema.characteristics
    }
}
