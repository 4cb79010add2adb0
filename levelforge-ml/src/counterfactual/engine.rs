//! Counterfactual search: generate -> score -> accept/reject under an attempt ceiling.
//!
//! The search walks through stages. Each stage fixes how many characteristics a candidate
//! changes and how far beyond the observed range values may go:
//!
//! ```text
//! widening 0: change 1, change 2, ..., change max_modified
//! widening 1: change 1, change 2, ..., change max_modified
//! ...
//! ```
//!
//! Every attempt is a pure function of `(seed, attempt number)`. Batches of attempts are
//! scored in parallel and merged back in attempt order, so a seeded search returns the
//! same result set whether it runs on one thread or many.

use crate::counterfactual::candidate::{Counterfactual, CounterfactualSet, SearchStats};
use crate::counterfactual::sampler::{Direction, Preference, SamplingParams, sample_value};
use crate::error::{ExhaustionReason, ScoreError, SearchError};
use crate::scorer::LevelScorer;
use levelforge_core::{CharacteristicVector, DatasetProfile, Level, SearchOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One `(widening round, subset size)` step of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stage {
    widening: f64,
    subset: usize,
}

fn plan_stages(options: &SearchOptions, characteristics: usize) -> Vec<Stage> {
    let max_subset = options
        .max_modified
        .unwrap_or(characteristics)
        .clamp(1, characteristics.max(1));
    (0..=options.range_widenings)
        .flat_map(|round| {
            let widening = round as f64 * options.widening_step;
            (1..=max_subset).map(move |subset| Stage { widening, subset })
        })
        .collect()
}

/// SplitMix64 finaliser; decorrelates per-attempt seeds derived from one base seed.
fn attempt_seed(base: u64, attempt: usize) -> u64 {
    let mut z = base.wrapping_add((attempt as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

enum Outcome {
    Accepted(CharacteristicVector),
    Rejected,
    Skipped,
}

/// State owned by a single `generate` call.
struct Search<'a> {
    scorer: &'a LevelScorer,
    profile: &'a DatasetProfile,
    options: &'a SearchOptions,
    original: &'a CharacteristicVector,
    target: Level,
    direction: Direction,
    stages: Vec<Stage>,
    seed: u64,
}

impl Search<'_> {
    fn stage_index(&self, attempt: usize) -> usize {
        (attempt / self.options.attempts_per_stage).min(self.stages.len() - 1)
    }

    fn attempt(&self, n: usize) -> Result<Outcome, ScoreError> {
        let mut rng = StdRng::seed_from_u64(attempt_seed(self.seed, n));
        let stage = self.stages[self.stage_index(n)];
        let schema = self.scorer.schema();
        let params = SamplingParams {
            widening: stage.widening,
            policy: self.options.sampling,
            bias: self.options.direction_bias,
        };

        let mut positions = rand::seq::index::sample(&mut rng, schema.len(), stage.subset).into_vec();
        positions.sort_unstable();

        let mut changes = Vec::with_capacity(positions.len());
        for i in positions {
            let (Some(characteristic), Some(profile), Some(original)) = (
                schema.characteristic(i),
                self.profile.characteristic(i),
                self.original.value(i),
            ) else {
                return Ok(Outcome::Skipped);
            };
            let preference = Preference::for_trend(characteristic.trend, self.direction);
            match sample_value(
                &mut rng,
                profile,
                characteristic.domain,
                original,
                preference,
                params,
            ) {
                Some(value) => changes.push((i, value)),
                None => return Ok(Outcome::Skipped),
            }
        }

        let Some(candidate) = self.original.with_values(&changes) else {
            return Ok(Outcome::Skipped);
        };
        if self.scorer.score(&candidate)? == self.target {
            Ok(Outcome::Accepted(candidate))
        } else {
            Ok(Outcome::Rejected)
        }
    }

    fn run_batch(&self, attempts: std::ops::Range<usize>) -> Vec<Result<Outcome, ScoreError>> {
        if self.options.parallel {
            attempts.into_par_iter().map(|n| self.attempt(n)).collect()
        } else {
            attempts.map(|n| self.attempt(n)).collect()
        }
    }
}

/// Find up to `options.total_counterfactuals` vectors close to `original` that `scorer`
/// places at exactly `target`.
///
/// Every returned candidate re-scores at `target`, and its mask marks exactly the
/// characteristics that differ from `original`. If `original` already scores `target`,
/// the unmodified vector is the first candidate. An empty outcome is reported as
/// [`SearchError::Exhausted`], never as an empty set.
///
/// Only the scorer's level range bounds `target`. A target beyond the levels observed in
/// the profile is still searched; it is merely logged. Sampled values always respect the
/// schema's hard domains, whatever domains the profile carries.
pub fn generate(
    original: &CharacteristicVector,
    target: Level,
    scorer: &LevelScorer,
    profile: &DatasetProfile,
    options: &SearchOptions,
) -> Result<CounterfactualSet, SearchError> {
    options.validate()?;
    scorer.schema().validate(original)?;
    let range = scorer.level_range();
    if !range.contains(target) {
        return Err(SearchError::InvalidTarget { target, range });
    }
    if !profile.matches_schema(scorer.schema()) {
        return Err(SearchError::ProfileMismatch);
    }
    if !profile.level_range().contains(target) {
        tracing::debug!(
            %target,
            observed = %profile.level_range(),
            "Target lies outside the levels seen in the training data"
        );
    }

    let started = Instant::now();
    let deadline = options
        .deadline_ms
        .map(|ms| started + Duration::from_millis(ms));
    let original_level = scorer.score(original)?;
    let wanted = options.total_counterfactuals;

    let _span = tracing::debug_span!(
        "counterfactual_search",
        model = scorer.model_name(),
        %original_level,
        %target
    )
    .entered();

    let mut stats = SearchStats::default();
    let mut candidates = Vec::with_capacity(wanted);
    let mut seen: HashSet<Vec<i64>> = HashSet::new();
    seen.insert(original.values());

    if original_level == target {
        tracing::debug!("Original already scores at the target level");
        candidates.push(Counterfactual::trivial(original));
        stats.accepted += 1;
    }

    let search = Search {
        scorer,
        profile,
        options,
        original,
        target,
        direction: Direction::between(original_level.get(), target.get()),
        stages: plan_stages(options, scorer.schema().len()),
        seed: options.seed.unwrap_or_else(rand::random),
    };

    let mut next = 0;
    let mut last_stage = None;
    let mut exhaustion = ExhaustionReason::AttemptCeiling;
    'search: while candidates.len() < wanted && next < options.max_attempts {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            exhaustion = ExhaustionReason::Deadline;
            break;
        }

        let stage = search.stage_index(next);
        if last_stage != Some(stage) {
            let Stage { widening, subset } = search.stages[stage];
            tracing::debug!(stage, subset, widening, attempt = next, "Entering search stage");
            last_stage = Some(stage);
            stats.stages_visited += 1;
        }

        // Batches never straddle two stages, except the last stage which runs to the ceiling.
        let mut end = (next + options.batch_size).min(options.max_attempts);
        if stage + 1 < search.stages.len() {
            end = end.min((stage + 1) * options.attempts_per_stage);
        }
        for outcome in search.run_batch(next..end) {
            stats.attempts += 1;
            match outcome? {
                Outcome::Accepted(vector) => {
                    if seen.insert(vector.values()) {
                        candidates.push(Counterfactual::new(original, vector));
                        stats.accepted += 1;
                        if candidates.len() >= wanted {
                            break 'search;
                        }
                    } else {
                        stats.duplicates += 1;
                    }
                }
                Outcome::Rejected => stats.rejected += 1,
                Outcome::Skipped => stats.skipped += 1,
            }
        }
        next = end;
    }
    stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if candidates.is_empty() {
        tracing::warn!(
            attempts = stats.attempts,
            rejected = stats.rejected,
            skipped = stats.skipped,
            reason = %exhaustion,
            "No counterfactual found"
        );
        return Err(SearchError::Exhausted {
            target,
            attempts: stats.attempts,
            reason: exhaustion,
        });
    }

    tracing::info!(
        found = candidates.len(),
        wanted,
        attempts = stats.attempts,
        elapsed_ms = stats.elapsed_ms,
        "Counterfactual search finished"
    );
    Ok(CounterfactualSet {
        original: original.clone(),
        target,
        original_level,
        candidates,
        stats,
    })
}

/// Long-lived handle bundling the scorer, profile and search policy.
///
/// Holds no per-request state: every [`generate`](Self::generate) call starts fresh.
#[derive(Debug, Clone)]
pub struct CounterfactualEngine {
    scorer: LevelScorer,
    profile: Arc<DatasetProfile>,
    options: SearchOptions,
}

impl CounterfactualEngine {
    pub fn new(
        scorer: LevelScorer,
        profile: Arc<DatasetProfile>,
        options: SearchOptions,
    ) -> Result<Self, SearchError> {
        options.validate()?;
        if !profile.matches_schema(scorer.schema()) {
            return Err(SearchError::ProfileMismatch);
        }
        Ok(Self {
            scorer,
            profile,
            options,
        })
    }

    pub fn scorer(&self) -> &LevelScorer {
        &self.scorer
    }

    pub fn profile(&self) -> &DatasetProfile {
        &self.profile
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn score(&self, vector: &CharacteristicVector) -> Result<Level, ScoreError> {
        self.scorer.score(vector)
    }

    pub fn generate(
        &self,
        original: &CharacteristicVector,
        target: Level,
    ) -> Result<CounterfactualSet, SearchError> {
        generate(original, target, &self.scorer, &self.profile, &self.options)
    }

    /// Same as [`generate`](Self::generate) with a one-off policy.
    pub fn generate_with(
        &self,
        original: &CharacteristicVector,
        target: Level,
        options: &SearchOptions,
    ) -> Result<CounterfactualSet, SearchError> {
        generate(original, target, &self.scorer, &self.profile, options)
    }
}
