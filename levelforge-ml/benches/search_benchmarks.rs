use criterion::{Criterion, black_box, criterion_group, criterion_main};
use levelforge_core::{
    DatasetProfile, FeatureSchema, Level, LevelRange, LevelRow, LevelTable, SamplingPolicy,
    SearchOptions,
};
use levelforge_ml::counterfactual::generate;
use levelforge_ml::{
    Aggregation, DecisionTree, LevelScorer, LinearModel, Predictor, TreeEnsemble, TreeNode,
};
use std::sync::Arc;

const WEIGHTS: [f64; 8] = [0.25, 0.2, 0.25, 0.05, 0.1, 0.05, 0.2, 0.012];

fn linear_scorer(schema: &Arc<FeatureSchema>) -> LevelScorer {
    let model: Arc<dyn Predictor> = Arc::new(LinearModel::new(WEIGHTS.to_vec(), -6.0));
    LevelScorer::new(schema.clone(), model, LevelRange::PATHFINDER).unwrap()
}

/// Two shallow trees splitting on armor class and hit points.
fn forest_scorer(schema: &Arc<FeatureSchema>) -> LevelScorer {
    let stump = |feature: usize, threshold: f64, low: f64, high: f64| {
        DecisionTree::new(
            8,
            vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        )
        .unwrap()
    };
    let ensemble = TreeEnsemble::new(
        vec![stump(6, 30.0, 2.0, 10.0), stump(7, 250.0, 3.0, 9.0)],
        0.0,
        1.0,
        Aggregation::Mean,
    )
    .unwrap();
    let model: Arc<dyn Predictor> = Arc::new(ensemble);
    LevelScorer::new(schema.clone(), model, LevelRange::PATHFINDER).unwrap()
}

fn bestiary(schema: &FeatureSchema, scorer: &LevelScorer) -> LevelTable {
    let mut table = LevelTable::new(schema.names()).unwrap();
    for i in 0..500i64 {
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
        let vector = schema.vector_from_pairs(schema.names().zip(values)).unwrap();
        table
            .push_row(LevelRow {
                values: values.iter().map(|v| Some(*v as f64)).collect(),
                level: scorer.score(&vector).unwrap(),
                source: None,
            })
            .unwrap();
    }
    table
}

fn bench_scoring(c: &mut Criterion) {
    let schema = Arc::new(FeatureSchema::core());
    let linear = linear_scorer(&schema);
    let forest = forest_scorer(&schema);
    let brute = schema
        .vector_from_pairs(schema.names().zip([7, 2, 5, 1, 2, 1, 29, 215]))
        .unwrap();

    c.bench_function("score_linear", |b| {
        b.iter(|| linear.score(black_box(&brute)))
    });
    c.bench_function("score_tree_ensemble", |b| {
        b.iter(|| forest.score(black_box(&brute)))
    });
}

fn bench_profile(c: &mut Criterion) {
    let schema = Arc::new(FeatureSchema::core());
    let table = bestiary(&schema, &linear_scorer(&schema));
    c.bench_function("profile_build_500_rows", |b| {
        b.iter(|| DatasetProfile::build(black_box(&table), &schema))
    });
}

fn bench_search(c: &mut Criterion) {
    let schema = Arc::new(FeatureSchema::core());
    let scorer = linear_scorer(&schema);
    let profile = DatasetProfile::build(&bestiary(&schema, &scorer), &schema).unwrap();
    let brute = schema
        .vector_from_pairs(schema.names().zip([7, 2, 5, 1, 2, 1, 29, 215]))
        .unwrap();

    let mut group = c.benchmark_group("counterfactual_search");
    for (label, parallel, sampling) in [
        ("sequential_uniform", false, SamplingPolicy::Uniform),
        ("parallel_uniform", true, SamplingPolicy::Uniform),
        ("sequential_observed", false, SamplingPolicy::Observed),
    ] {
        let options = SearchOptions {
            seed: Some(42),
            parallel,
            sampling,
            ..SearchOptions::default()
        };
        group.bench_function(label, |b| {
            b.iter(|| generate(black_box(&brute), Level(9), &scorer, &profile, &options))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scoring, bench_profile, bench_search);
criterion_main!(benches);
