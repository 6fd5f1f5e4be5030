//! Benchmarks for the recommendation path
//!
//! Run with: cargo bench --package server
//!
//! Uses a synthetic catalog so no data files are needed.

use catalog::{Catalog, ExerciseRecord};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use embedder::TfidfVectorizer;
use pipeline::UserPreferences;
use server::{AggregatorConfig, RecommendationAggregator};
use std::collections::HashMap;
use std::sync::Arc;

const MUSCLES: &[&str] = &[
    "chest", "back", "shoulders", "biceps", "triceps", "quadriceps", "hamstrings", "glutes",
    "calves", "abdominals",
];
const EQUIPMENT: &[&str] = &["dumbbell", "barbell", "cable", "machine", "kettlebell", "bands"];
const LEVELS: &[&str] = &["beginner", "intermediate", "expert"];
const GOALS: &[&str] = &["strength", "hypertrophy", "endurance", "power"];

fn build_aggregator(size: usize) -> RecommendationAggregator {
    let terms: Vec<&str> = MUSCLES
        .iter()
        .chain(EQUIPMENT)
        .chain(LEVELS)
        .chain(GOALS)
        .copied()
        .collect();
    let vocabulary: HashMap<String, usize> = terms
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect();
    let idf = (0..terms.len()).map(|i| 1.0 + (i % 5) as f32 * 0.25).collect();
    let vectorizer = TfidfVectorizer::new(vocabulary, idf).expect("Failed to build vectorizer");

    let records = (0..size)
        .map(|i| {
            let muscle = MUSCLES[i % MUSCLES.len()];
            let equipment = EQUIPMENT[(i / 3) % EQUIPMENT.len()];
            let level = LEVELS[(i / 7) % LEVELS.len()];
            let goal = GOALS[(i / 11) % GOALS.len()];
            ExerciseRecord::new(format!("Exercise {i}"), muscle, equipment, level)
                .with_combined_features(format!("{muscle} {equipment} {level} {goal}"))
        })
        .collect();

    RecommendationAggregator::new(
        Arc::new(Catalog::from_records(records)),
        Arc::new(vectorizer),
        AggregatorConfig::default(),
    )
}

fn preferences(muscle: &str) -> UserPreferences {
    UserPreferences {
        goal: "strength".to_string(),
        experience: "beginner".to_string(),
        equipment: "dumbbell".to_string(),
        muscle: muscle.to_string(),
    }
}

fn bench_single_muscle(c: &mut Criterion) {
    let aggregator = build_aggregator(1_000);
    let prefs = preferences("chest");

    c.bench_function("recommend_single_muscle_1k", |b| {
        b.iter(|| black_box(aggregator.recommend(black_box(&prefs)).unwrap()))
    });
}

fn bench_multi_muscle(c: &mut Criterion) {
    let aggregator = build_aggregator(1_000);
    let prefs = preferences("chest, back, biceps, calves");

    c.bench_function("recommend_four_muscles_1k", |b| {
        b.iter(|| black_box(aggregator.recommend(black_box(&prefs)).unwrap()))
    });
}

fn bench_large_catalog(c: &mut Criterion) {
    // large enough for the parallel scoring path
    let aggregator = build_aggregator(20_000);
    let prefs = preferences("chest, back");

    c.bench_function("recommend_two_muscles_20k", |b| {
        b.iter(|| black_box(aggregator.recommend(black_box(&prefs)).unwrap()))
    });
}

criterion_group!(benches, bench_single_muscle, bench_multi_muscle, bench_large_catalog);
criterion_main!(benches);
