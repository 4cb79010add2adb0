//! Replacement-value sampling for a single characteristic.

use levelforge_core::{CharacteristicProfile, SamplingPolicy, Trend, ValueDomain};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Which way the level has to move to reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Raise,
    Lower,
    Hold,
}

impl Direction {
    pub(crate) fn between(current: i32, target: i32) -> Self {
        match target.cmp(&current) {
            std::cmp::Ordering::Greater => Self::Raise,
            std::cmp::Ordering::Less => Self::Lower,
            std::cmp::Ordering::Equal => Self::Hold,
        }
    }
}

/// Preferred side of the original value for a new sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Preference {
    Higher,
    Lower,
    Either,
}

impl Preference {
    pub(crate) fn for_trend(trend: Trend, direction: Direction) -> Self {
        match (trend, direction) {
            (Trend::Increasing, Direction::Raise) | (Trend::Decreasing, Direction::Lower) => {
                Self::Higher
            }
            (Trend::Increasing, Direction::Lower) | (Trend::Decreasing, Direction::Raise) => {
                Self::Lower
            }
            _ => Self::Either,
        }
    }
}

/// Per-stage sampling parameters shared by every characteristic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SamplingParams {
    pub widening: f64,
    pub policy: SamplingPolicy,
    pub bias: f64,
}

/// Draw a value different from `original` inside the characteristic's plausible range.
///
/// The widened profile range is intersected with `domain`, the schema's hard limits, so a
/// profile carrying a stale or missing domain cannot produce an invalid value.
/// With probability `bias` the draw is restricted to the preferred side of `original`
/// (when that side is non-empty). Returns `None` when no other value is admissible.
pub(crate) fn sample_value<R: Rng + ?Sized>(
    rng: &mut R,
    profile: &CharacteristicProfile,
    domain: ValueDomain,
    original: i64,
    preference: Preference,
    params: SamplingParams,
) -> Option<i64> {
    let (lo, hi) = profile.bounds(params.widening);
    let (lo, hi) = domain.restrict(lo, hi);
    if lo > hi {
        return None;
    }

    let (mut from, mut to) = (lo, hi);
    if preference != Preference::Either && rng.gen_bool(params.bias) {
        let (dir_lo, dir_hi) = match preference {
            Preference::Higher => (lo.max(original.saturating_add(1)), hi),
            _ => (lo, hi.min(original.saturating_sub(1))),
        };
        if dir_lo <= dir_hi {
            (from, to) = (dir_lo, dir_hi);
        }
    }

    let observed_only = params.policy == SamplingPolicy::Observed && params.widening == 0.0;
    if observed_only {
        if let Some(v) = draw_observed(rng, profile, from, to, original) {
            return Some(v);
        }
    }
    draw_uniform_excluding(rng, from, to, original)
}

/// Uniform integer in `[lo, hi]` other than `skip`.
fn draw_uniform_excluding<R: Rng + ?Sized>(rng: &mut R, lo: i64, hi: i64, skip: i64) -> Option<i64> {
    if lo > hi {
        return None;
    }
    if skip < lo || skip > hi {
        return Some(rng.gen_range(lo..=hi));
    }
    if lo == hi {
        return None;
    }
    // Draw from one fewer slot and step over `skip`.
    let v = rng.gen_range(lo..hi);
    Some(if v >= skip { v + 1 } else { v })
}

/// Value in `[lo, hi]` other than `skip`, weighted by observed frequency.
fn draw_observed<R: Rng + ?Sized>(
    rng: &mut R,
    profile: &CharacteristicProfile,
    lo: i64,
    hi: i64,
    skip: i64,
) -> Option<i64> {
    let (values, weights): (Vec<i64>, Vec<usize>) = profile
        .histogram
        .range(lo..=hi)
        .filter(|(v, _)| **v != skip)
        .map(|(v, c)| (*v, *c))
        .unzip();
    let dist = WeightedIndex::new(&weights).ok()?;
    values.get(dist.sample(rng)).copied()
}
