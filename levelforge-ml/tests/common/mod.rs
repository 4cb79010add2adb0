//! Shared fixtures: a synthetic bestiary scored by a known linear model.

#![allow(dead_code)]

use levelforge_core::{
    CharacteristicVector, DatasetProfile, FeatureSchema, Level, LevelRange, LevelRow, LevelTable,
    ValueDomain,
};
use levelforge_ml::{LevelScorer, LinearModel, Predictor};
use std::sync::Arc;

pub const WEIGHTS: [f64; 8] = [0.25, 0.2, 0.25, 0.05, 0.1, 0.05, 0.2, 0.012];
pub const INTERCEPT: f64 = -6.0;

pub fn schema() -> Arc<FeatureSchema> {
    Arc::new(FeatureSchema::core())
}

pub fn linear_scorer() -> LevelScorer {
    let model: Arc<dyn Predictor> = Arc::new(LinearModel::new(WEIGHTS.to_vec(), INTERCEPT));
    LevelScorer::new(schema(), model, LevelRange::PATHFINDER).expect("weights match schema")
}

/// 240 creatures spread over str -5..=12, ac 10..=54, hp 5..=604 and so on,
/// labelled by the linear model.
pub fn bestiary() -> LevelTable {
    let scorer = linear_scorer();
    let schema = schema();
    let mut table = LevelTable::new(schema.names()).expect("unique columns");
    for i in 0..240i64 {
        let values = [
            -5 + (i * 7) % 18,
            -4 + (i * 5) % 14,
            -5 + (i * 3) % 17,
            -5 + (i * 11) % 13,
            -3 + (i * 13) % 12,
            -5 + (i * 17) % 14,
            10 + (i * 19) % 45,
            5 + (i * 37) % 600,
        ];
        let vector = schema
            .vector_from_pairs(schema.names().zip(values))
            .expect("fixture row fits schema");
        let level = scorer.score(&vector).expect("fixture row scores");
        table
            .push_row(LevelRow {
                values: values.iter().map(|v| Some(*v as f64)).collect(),
                level,
                source: Some("Synthetic Bestiary".to_string()),
            })
            .expect("row width matches");
    }
    table
}

pub fn profile() -> DatasetProfile {
    DatasetProfile::build(&bestiary(), &schema()).expect("fixture table profiles")
}

/// The bestiary profile with every hard domain dropped, as a profile assembled elsewhere
/// might arrive.
pub fn unbounded_profile() -> DatasetProfile {
    let base = profile();
    let characteristics = base
        .iter()
        .cloned()
        .map(|mut c| {
            c.domain = ValueDomain::UNBOUNDED;
            c
        })
        .collect();
    DatasetProfile::from_parts(characteristics, base.level_range(), base.rows())
}

pub fn monster(values: [i64; 8]) -> CharacteristicVector {
    let schema = schema();
    schema
        .vector_from_pairs(schema.names().zip(values))
        .expect("monster fits schema")
}

/// The level-9 request from the original test suite.
pub fn brute() -> CharacteristicVector {
    monster([7, 2, 5, 1, 2, 1, 29, 215])
}

pub fn assert_level(scorer: &LevelScorer, vector: &CharacteristicVector, level: i32) {
    assert_eq!(scorer.score(vector).expect("scores"), Level(level));
}
