//! Property-based tests for the counterfactual search using proptest.

mod common;

use common::{linear_scorer, monster, profile, unbounded_profile};
use levelforge_core::{DatasetProfile, Level, SearchOptions};
use levelforge_ml::{LevelScorer, SearchError};
use proptest::prelude::*;
use std::sync::LazyLock;

static SCORER: LazyLock<LevelScorer> = LazyLock::new(linear_scorer);
static PROFILE: LazyLock<DatasetProfile> = LazyLock::new(profile);
static UNBOUNDED: LazyLock<DatasetProfile> = LazyLock::new(unbounded_profile);

fn creature() -> impl Strategy<Value = [i64; 8]> {
    (
        (-5i64..=12, -4i64..=9, -5i64..=11, -5i64..=7),
        (-3i64..=8, -5i64..=8, 10i64..=54, 5i64..=600),
    )
        .prop_map(|((s, d, c, i), (w, ch, ac, hp))| [s, d, c, i, w, ch, ac, hp])
}

fn options(seed: u64) -> SearchOptions {
    SearchOptions {
        seed: Some(seed),
        max_attempts: 2_000,
        attempts_per_stage: 100,
        parallel: false,
        ..SearchOptions::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_candidate_scores_at_target(
        values in creature(),
        target in -1i32..=12,
        seed in any::<u64>(),
    ) {
        let original = monster(values);
        match levelforge_ml::counterfactual::generate(&original, Level(target), &SCORER, &PROFILE, &options(seed)) {
            Ok(set) => {
                prop_assert!(!set.is_empty());
                prop_assert!(set.len() <= 4);
                for cf in &set {
                    prop_assert_eq!(SCORER.score(cf.vector()).unwrap(), Level(target));
                    prop_assert!(cf.vector().same_keys(&original));
                }
            }
            Err(SearchError::Exhausted { target: t, .. }) => prop_assert_eq!(t, Level(target)),
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn mask_marks_exactly_the_changed_characteristics(
        values in creature(),
        target in 0i32..=10,
        seed in any::<u64>(),
    ) {
        let original = monster(values);
        if let Ok(set) = levelforge_ml::counterfactual::generate(&original, Level(target), &SCORER, &PROFILE, &options(seed)) {
            for cf in &set {
                prop_assert_eq!(cf.mask().len(), original.len());
                for i in 0..original.len() {
                    prop_assert_eq!(cf.mask()[i], cf.vector().value(i) != original.value(i));
                }
                let changes = cf.changes(&original);
                prop_assert_eq!(changes.len(), cf.modified_count());
                for change in changes {
                    prop_assert_eq!(original.get(&change.name), Some(change.from));
                    prop_assert_ne!(change.from, change.to);
                }
            }
        }
    }

    #[test]
    fn candidates_are_distinct(
        values in creature(),
        target in 0i32..=10,
        seed in any::<u64>(),
    ) {
        let original = monster(values);
        if let Ok(set) = levelforge_ml::counterfactual::generate(&original, Level(target), &SCORER, &PROFILE, &options(seed)) {
            let mut seen = std::collections::HashSet::new();
            for cf in &set {
                prop_assert!(seen.insert(cf.vector().values()));
            }
        }
    }

    #[test]
    fn search_leaves_original_untouched(values in creature(), seed in any::<u64>()) {
        let original = monster(values);
        let before = original.clone();
        let _ = levelforge_ml::counterfactual::generate(&original, Level(7), &SCORER, &PROFILE, &options(seed));
        prop_assert_eq!(original, before);
    }

    #[test]
    fn original_at_target_comes_first(values in creature(), seed in any::<u64>()) {
        let original = monster(values);
        let level = SCORER.score(&original).unwrap();
        let set = levelforge_ml::counterfactual::generate(&original, level, &SCORER, &PROFILE, &options(seed)).unwrap();
        prop_assert!(set.candidates[0].is_trivial());
        prop_assert_eq!(set.candidates[0].vector(), &original);
        prop_assert_eq!(set.iter().filter(|c| c.is_trivial()).count(), 1);
    }

    #[test]
    fn widened_candidates_stay_inside_schema_domains(
        values in creature(),
        target in -1i32..=3,
        seed in any::<u64>(),
        drop_domains in any::<bool>(),
    ) {
        let original = monster(values);
        let profile: &DatasetProfile = if drop_domains { &*UNBOUNDED } else { &*PROFILE };
        let wide = SearchOptions {
            max_modified: Some(3),
            attempts_per_stage: 30,
            range_widenings: 3,
            widening_step: 2.0,
            direction_bias: 1.0,
            total_counterfactuals: 8,
            ..options(seed)
        };
        match levelforge_ml::counterfactual::generate(&original, Level(target), &SCORER, profile, &wide) {
            Ok(set) => {
                for cf in &set {
                    prop_assert!(SCORER.schema().validate(cf.vector()).is_ok());
                }
            }
            Err(SearchError::Exhausted { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn same_seed_same_answers(values in creature(), target in 0i32..=10, seed in any::<u64>()) {
        let original = monster(values);
        let first = levelforge_ml::counterfactual::generate(&original, Level(target), &SCORER, &PROFILE, &options(seed));
        let second = levelforge_ml::counterfactual::generate(&original, Level(target), &SCORER, &PROFILE, &options(seed));
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.candidates, b.candidates),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "seeded runs disagree"),
        }
    }
}
