//! Accepted counterfactuals and the result set returned to callers.

use levelforge_core::{CharacteristicVector, Level};
use serde::{Deserialize, Serialize};

/// One characteristic that a counterfactual changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub name: String,
    pub from: i64,
    pub to: i64,
}

/// A perturbed vector plus the mask of positions that differ from the original.
///
/// The mask is always derived from the vectors, never supplied, so `mask[i]` holds
/// exactly when `vector[i] != original[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counterfactual {
    vector: CharacteristicVector,
    mask: Vec<bool>,
}

impl Counterfactual {
    pub fn new(original: &CharacteristicVector, vector: CharacteristicVector) -> Self {
        let mask = vector.diff_mask(original);
        Self { vector, mask }
    }

    /// The unmodified original.
    pub fn trivial(original: &CharacteristicVector) -> Self {
        Self {
            vector: original.clone(),
            mask: vec![false; original.len()],
        }
    }

    pub fn vector(&self) -> &CharacteristicVector {
        &self.vector
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn into_vector(self) -> CharacteristicVector {
        self.vector
    }

    pub fn is_trivial(&self) -> bool {
        !self.mask.iter().any(|m| *m)
    }

    pub fn modified_count(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }

    pub fn modified_names(&self) -> Vec<&str> {
        self.vector
            .names()
            .zip(&self.mask)
            .filter(|(_, m)| **m)
            .map(|(n, _)| n)
            .collect()
    }

    /// The individual edits relative to `original`.
    pub fn changes(&self, original: &CharacteristicVector) -> Vec<Change> {
        self.vector
            .iter()
            .zip(&self.mask)
            .enumerate()
            .filter(|(_, (_, m))| **m)
            .filter_map(|(i, ((name, to), _))| {
                original.value(i).map(|from| Change {
                    name: name.to_string(),
                    from,
                    to,
                })
            })
            .collect()
    }
}

/// Counters describing how a search went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Candidates generated and examined.
    pub attempts: usize,
    pub accepted: usize,
    /// Scored, but at the wrong level.
    pub rejected: usize,
    /// Abandoned before scoring because a chosen characteristic had no alternative value.
    pub skipped: usize,
    /// Scored at the target level but identical to an earlier result.
    pub duplicates: usize,
    pub stages_visited: usize,
    pub elapsed_ms: u64,
}

/// Accepted counterfactuals for one `(original, target)` request, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterfactualSet {
    pub original: CharacteristicVector,
    pub target: Level,
    pub original_level: Level,
    pub candidates: Vec<Counterfactual>,
    pub stats: SearchStats,
}

impl CounterfactualSet {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Counterfactual> {
        self.candidates.iter()
    }

    /// True when the original already scores at the target level.
    pub fn has_trivial(&self) -> bool {
        self.candidates.iter().any(Counterfactual::is_trivial)
    }

    /// The counterfactual with the fewest modified characteristics.
    pub fn sparsest(&self) -> Option<&Counterfactual> {
        self.candidates.iter().min_by_key(|c| c.modified_count())
    }
}

impl<'a> IntoIterator for &'a CounterfactualSet {
    type Item = &'a Counterfactual;
    type IntoIter = std::slice::Iter<'a, Counterfactual>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
