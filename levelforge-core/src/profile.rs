//! Dataset profile: empirical per-characteristic ranges and distributions.
//!
//! The profile keeps counterfactual suggestions plausible. It is computed once from the
//! flattened training table and is read-only afterwards.

use crate::error::ProfileError;
use crate::level::{Level, LevelRange};
use crate::schema::{FeatureSchema, ValueDomain};
use crate::table::LevelTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Observed statistics for one characteristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicProfile {
    pub name: String,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub observations: usize,
    /// Count of each observed (rounded) value.
    pub histogram: BTreeMap<i64, usize>,
    #[serde(default)]
    pub domain: ValueDomain,
}

impl CharacteristicProfile {
    pub fn span(&self) -> i64 {
        self.max - self.min
    }

    /// Observed range, widened by `widening` times the span on both sides and clipped
    /// to the hard domain.
    ///
    /// Any positive widening moves each bound by at least one.
    pub fn bounds(&self, widening: f64) -> (i64, i64) {
        let pad = if widening > 0.0 {
            ((self.span() as f64 * widening).ceil() as i64).max(1)
        } else {
            0
        };
        let lo = self.min.saturating_sub(pad);
        let hi = self.max.saturating_add(pad);
        self.domain.restrict(lo, hi)
    }

    /// How often `value` was observed.
    pub fn frequency(&self, value: i64) -> usize {
        self.histogram.get(&value).copied().unwrap_or(0)
    }
}

/// Per-characteristic ranges for a feature schema, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    characteristics: Vec<CharacteristicProfile>,
    levels: LevelRange,
    rows: usize,
}

impl DatasetProfile {
    /// Derive a profile from `table` for every characteristic of `schema`.
    ///
    /// Null cells are skipped. Fails when the table is empty, lacks a characteristic column,
    /// or has a column where every cell is null.
    pub fn build(table: &LevelTable, schema: &FeatureSchema) -> Result<Self, ProfileError> {
        if table.is_empty() {
            return Err(ProfileError::EmptyTable);
        }

        let mut characteristics = Vec::with_capacity(schema.len());
        for c in schema.iter() {
            let cells = table
                .column_values(&c.name)
                .ok_or_else(|| ProfileError::MissingColumn {
                    name: c.name.clone(),
                })?;
            let observed: Vec<f64> = cells.into_iter().flatten().filter(|v| v.is_finite()).collect();
            if observed.is_empty() {
                return Err(ProfileError::NoObservations {
                    name: c.name.clone(),
                });
            }

            let mut histogram = BTreeMap::new();
            for v in &observed {
                *histogram.entry(v.round() as i64).or_insert(0) += 1;
            }
            let (min, max) = match (histogram.keys().next(), histogram.keys().next_back()) {
                (Some(&lo), Some(&hi)) => (lo, hi),
                _ => {
                    return Err(ProfileError::NoObservations {
                        name: c.name.clone(),
                    });
                }
            };
            let mean = observed.iter().sum::<f64>() / observed.len() as f64;

            characteristics.push(CharacteristicProfile {
                name: c.name.clone(),
                min,
                max,
                mean,
                observations: observed.len(),
                histogram,
                domain: c.domain,
            });
        }

        let mut levels = table.levels();
        let first = levels.next().unwrap_or(Level(0));
        let (lo, hi) = levels.fold((first, first), |(lo, hi), l| (lo.min(l), hi.max(l)));

        tracing::debug!(
            rows = table.row_count(),
            characteristics = characteristics.len(),
            min_level = %lo,
            max_level = %hi,
            "Built dataset profile"
        );

        Ok(Self {
            characteristics,
            levels: LevelRange::new(lo, hi),
            rows: table.row_count(),
        })
    }

    /// Read a JSON-lines table from `path` and profile it against `schema`.
    pub fn load(path: impl AsRef<Path>, schema: &FeatureSchema) -> crate::Result<Self> {
        let input = std::fs::read_to_string(path.as_ref())?;
        let table = LevelTable::from_json_lines(&input)?;
        Ok(Self::build(&table, schema)?)
    }

    /// Assemble a profile from precomputed entries.
    pub fn from_parts(
        characteristics: Vec<CharacteristicProfile>,
        levels: LevelRange,
        rows: usize,
    ) -> Self {
        Self {
            characteristics,
            levels,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.characteristics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characteristics.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Lowest and highest level observed in the training table.
    pub fn level_range(&self) -> LevelRange {
        self.levels
    }

    pub fn characteristic(&self, index: usize) -> Option<&CharacteristicProfile> {
        self.characteristics.get(index)
    }

    pub fn get(&self, name: &str) -> Option<&CharacteristicProfile> {
        self.characteristics.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacteristicProfile> {
        self.characteristics.iter()
    }

    /// Widened plausible range for the characteristic at `index`.
    pub fn bounds(&self, index: usize, widening: f64) -> Option<(i64, i64)> {
        self.characteristics.get(index).map(|c| c.bounds(widening))
    }

    /// True when this profile covers exactly `schema`'s characteristics, in order.
    pub fn matches_schema(&self, schema: &FeatureSchema) -> bool {
        self.characteristics.len() == schema.len()
            && self
                .characteristics
                .iter()
                .map(|c| c.name.as_str())
                .eq(schema.names())
    }
}
