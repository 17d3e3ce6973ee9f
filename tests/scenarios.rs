mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{scenario_a, test_config};
use dupgate::{Algorithm, DedupEngine, DetectionResult, RunOutcome, RunReport};
use keyword::{KeywordAction, KeywordConfig, KeywordDeduplicator, GENERAL_ANGLE};
use tempfile::tempdir;

fn run(algorithm: Algorithm) -> RunReport {
    let dir = tempdir().unwrap();
    scenario_a(dir.path());
    let mut cfg = test_config();
    cfg.detection = cfg
        .detection
        .with_algorithm(algorithm)
        .with_window_days(90)
        .with_threshold(0.7);
    let engine = DedupEngine::new(cfg).unwrap();
    match engine.run(dir.path()).unwrap() {
        RunOutcome::Completed(report) => report,
        RunOutcome::Cancelled => panic!("unexpected cancellation"),
    }
}

fn file_name(id: &str) -> &str {
    id.rsplit(['/', '\\']).next().unwrap_or(id)
}

#[test]
fn scenario_a_graph_groups_the_near_copy_and_leaves_day_95_alone() {
    let report = run(Algorithm::Graph);
    let DetectionResult::Graph {
        duplicate_groups,
        unique_documents,
        total_comparisons,
        ..
    } = &report.result
    else {
        panic!("graph result expected");
    };

    assert_eq!(*total_comparisons, 1);
    assert_eq!(duplicate_groups.len(), 1);
    let group = &duplicate_groups[0];
    assert_eq!(group.group_id, 1);
    assert_eq!(group.base_document.file_name, "day-000.md");
    let members: Vec<_> = group
        .members
        .iter()
        .map(|m| (m.document.file_name.as_str(), m.is_base))
        .collect();
    assert_eq!(members, vec![("day-000.md", true), ("day-002.md", false)]);
    assert!(group.members[1].similarity_to_base >= 0.7);

    assert_eq!(unique_documents.len(), 1);
    assert_eq!(unique_documents[0].file_name, "day-095.md");
}

#[test]
fn scenario_a_linear_moves_the_near_copy() {
    let report = run(Algorithm::Linear);
    let DetectionResult::Linear {
        kept,
        moved,
        total_comparisons,
        ..
    } = &report.result
    else {
        panic!("linear result expected");
    };

    assert_eq!(*total_comparisons, 1);
    let kept: Vec<_> = kept.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(kept, vec!["day-000.md", "day-095.md"]);
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].document.file_name, "day-002.md");
    assert_eq!(file_name(&moved[0].base_id), "day-000.md");
    assert!(moved[0].document.effective_date > kept_date(&report, "day-000.md"));
}

fn kept_date(report: &RunReport, name: &str) -> chrono::DateTime<Utc> {
    report
        .result
        .kept_documents()
        .into_iter()
        .find(|d| d.file_name == name)
        .map(|d| d.effective_date)
        .unwrap()
}

#[test]
fn scenario_b_rewrites_the_overlapping_keyword() {
    let mut dedup = KeywordDeduplicator::in_memory(KeywordConfig::default()).unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();

    let first = dedup
        .process_at("smart plug alexa", "smart-home", "planner", t0)
        .unwrap();
    assert_eq!(first.action, KeywordAction::AcceptedOriginal);
    assert_eq!(first.angle, GENERAL_ANGLE);

    let second = dedup
        .process_at(
            "smart plug alexa compatible",
            "smart-home",
            "planner",
            t0 + Duration::days(2),
        )
        .unwrap();
    assert!(second.is_duplicate);
    assert!(second.angle_changed);
    assert_eq!(second.action, KeywordAction::AngleChanged);
    assert_ne!(second.angle, GENERAL_ANGLE);
    assert_ne!(second.processed_keyword, "smart plug alexa compatible");
    assert!(second.novelty_penalty > 0.0);
    assert!(second.reason.contains("stem overlap 0.75"));
    assert!((second.freshness_score - 0.25).abs() < 1e-9);
}
