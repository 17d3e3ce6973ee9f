mod common;

use std::fs;

use common::{scenario_a, test_config, write_article, BREAD_WORDS, PLUG_WORDS};
use dupgate::{Algorithm, CacheStats, DedupEngine, DetectionResult, RunOutcome};
use tempfile::tempdir;

fn graph_result(dir: &std::path::Path, parallel: bool) -> DetectionResult {
    let mut cfg = test_config();
    cfg.detection = cfg
        .detection
        .with_algorithm(Algorithm::Graph)
        .with_parallel(parallel);
    let engine = DedupEngine::new(cfg).unwrap();
    match engine.run(dir).unwrap() {
        RunOutcome::Completed(report) => report.result,
        RunOutcome::Cancelled => panic!("unexpected cancellation"),
    }
}

fn mixed_corpus(dir: &std::path::Path) {
    scenario_a(dir);
    write_article(dir, "bread-a.md", "Sourdough Basics", "2024-01-02", BREAD_WORDS);
    write_article(dir, "bread-b.md", "Sourdough Basics Again", "2024-01-20", BREAD_WORDS);
    write_article(dir, "short.md", "Stub", "2024-01-02", "too short to compare");
}

#[test]
fn repeated_runs_serialize_identically() {
    let dir = tempdir().unwrap();
    mixed_corpus(dir.path());
    let first = serde_json::to_string(&graph_result(dir.path(), false)).unwrap();
    let second = serde_json::to_string(&graph_result(dir.path(), false)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn parallel_matrix_matches_sequential() {
    let dir = tempdir().unwrap();
    mixed_corpus(dir.path());
    assert_eq!(
        graph_result(dir.path(), false),
        graph_result(dir.path(), true)
    );
}

#[test]
fn graph_matrix_is_symmetric_with_unit_diagonal() {
    let dir = tempdir().unwrap();
    mixed_corpus(dir.path());
    let DetectionResult::Graph {
        similarity_matrix,
        total_comparisons,
        ..
    } = graph_result(dir.path(), false)
    else {
        panic!("graph result expected");
    };

    let n = similarity_matrix.len();
    assert_eq!(n, 5, "the short article never enters the matrix");
    for i in 0..n {
        assert_eq!(similarity_matrix.get(i, i), 1.0);
        for j in 0..n {
            assert_eq!(
                similarity_matrix.get(i, j).to_bits(),
                similarity_matrix.get(j, i).to_bits()
            );
        }
    }
    // Every pair except the three that reach across the 90-day gap.
    assert_eq!(total_comparisons, n * (n - 1) / 2 - 3);
}

#[test]
fn compare_is_symmetric() {
    let dir = tempdir().unwrap();
    let a = write_article(dir.path(), "a.md", "Smart Plug Guide", "2024-01-01", PLUG_WORDS);
    let b = write_article(
        dir.path(),
        "b.md",
        "Smart Plug Roundup",
        "2024-01-02",
        &common::edited_plug_words(20),
    );
    let engine = DedupEngine::new(test_config()).unwrap();

    let ab = engine.compare(&a, &b).unwrap();
    let ba = engine.compare(&b, &a).unwrap();
    assert_eq!(
        ab.overall_similarity.to_bits(),
        ba.overall_similarity.to_bits()
    );
    assert_eq!(ab.hamming_distance, ba.hamming_distance);
    assert_eq!(ab.is_duplicate, ba.is_duplicate);
}

#[test]
fn fingerprint_cache_survives_between_engines() {
    let dir = tempdir().unwrap();
    let articles = dir.path().join("articles");
    fs::create_dir(&articles).unwrap();
    mixed_corpus(&articles);

    let mut cfg = test_config();
    cfg.store.cache_path = Some(dir.path().join("cache").join("fingerprints.json"));

    let first = DedupEngine::new(cfg.clone()).unwrap();
    let RunOutcome::Completed(first_report) = first.run(&articles).unwrap() else {
        panic!("unexpected cancellation");
    };
    let cached = first.store().len();
    assert!(cached > 0);

    let second = DedupEngine::new(cfg).unwrap();
    assert_eq!(second.store().len(), cached);
    let RunOutcome::Completed(second_report) = second.run(&articles).unwrap() else {
        panic!("unexpected cancellation");
    };
    assert_eq!(
        serde_json::to_string(&first_report.result).unwrap(),
        serde_json::to_string(&second_report.result).unwrap()
    );
}

#[test]
fn second_engine_computes_nothing() {
    let dir = tempdir().unwrap();
    let articles = dir.path().join("articles");
    fs::create_dir(&articles).unwrap();
    mixed_corpus(&articles);

    let mut cfg = test_config();
    cfg.store.cache_path = Some(dir.path().join("fingerprints.json"));

    // day-000.md and day-095.md share a body, so six files make five hashes.
    let RunOutcome::Completed(first) = DedupEngine::new(cfg.clone()).unwrap().run(&articles).unwrap()
    else {
        panic!("unexpected cancellation");
    };
    assert_eq!(first.cache, CacheStats { hits: 1, misses: 5 });

    let RunOutcome::Completed(second) = DedupEngine::new(cfg.clone()).unwrap().run(&articles).unwrap()
    else {
        panic!("unexpected cancellation");
    };
    assert_eq!(second.cache, CacheStats { hits: 6, misses: 0 });

    // A different shingle size cannot reuse any of them.
    cfg.analyzer = cfg.analyzer.with_shingle_size(3);
    let RunOutcome::Completed(third) = DedupEngine::new(cfg).unwrap().run(&articles).unwrap() else {
        panic!("unexpected cancellation");
    };
    assert_eq!(third.cache, CacheStats { hits: 1, misses: 5 });
}
