//! Tracker integration tests against CSV-backed storage
//!
//! Covers:
//! - Loading tables from disk and persisting history/plan rewrites
//! - Recommendation and adaptive scenarios end to end
//! - Concurrent callers on one tracker

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use learning_records::{Confidence, CsvStorage, DataPaths, StoreError, Storage, StudentId};
use study_engine::{
    JsonPlanExport, PlanLayout, PlanRequest, Strategy, Tracker, TrackerConfig, TrackerError,
};
use tempfile::TempDir;

fn seed(dir: &Path) {
    fs::write(
        dir.join("topic_graph.csv"),
        "topic,relation,related_topic\n\
         Loops,prerequisite,Variables\n\
         Functions,prerequisite,Loops\n\
         Functions,advanced,Closures\n\
         Recursion,prerequisite,Functions\n\
         Recursion,advanced,Dynamic Programming\n\
         Sorting,related,Searching\n",
    )
    .unwrap();
    fs::write(
        dir.join("student_data.csv"),
        "student_id,completed_topics\n1,Variables;Loops\n2,Variables\n3,\n",
    )
    .unwrap();
    fs::write(
        dir.join("history.csv"),
        "student_id,topic,confidence\n1,Variables,88\n2,Variables,45\n",
    )
    .unwrap();
    fs::write(
        dir.join("resources.csv"),
        "topic,youtube_link,documentation_link\n\
         Functions,youtube.com/functions,docs.example.com/functions\n\
         Closures,,https://docs.example.com/closures\n",
    )
    .unwrap();
}

fn config(dir: &Path) -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.data = DataPaths::in_dir(dir);
    config.confidence.seed = Some(1234);
    config
}

fn open(dir: &Path) -> Tracker<CsvStorage> {
    let config = config(dir);
    Tracker::open(CsvStorage::new(config.data.clone()), config).unwrap()
}

// =============================================================================
// Confidence tracking
// =============================================================================

#[test]
fn test_ensure_writes_history_file() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());

    let entries = tracker.ensure_confidence_scores(StudentId(1)).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].topic, "Variables");
    assert_eq!(entries[0].confidence, Confidence::new(88));
    assert_eq!(entries[1].topic, "Loops");
    assert!((50..=100).contains(&entries[1].confidence.value()));

    let on_disk = CsvStorage::new(DataPaths::in_dir(dir.path())).load().unwrap();
    assert_eq!(on_disk.history.len(), 3);
    assert_eq!(on_disk.confidence(StudentId(1), "Loops"), Some(entries[1].confidence));
}

#[test]
fn test_ensure_is_idempotent() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());

    let first = tracker.ensure_confidence_scores(StudentId(1)).unwrap();
    let second = tracker.ensure_confidence_scores(StudentId(1)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_same_seed_same_scores() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    seed(a.path());
    seed(b.path());

    let left = open(a.path()).ensure_confidence_scores(StudentId(1)).unwrap();
    let right = open(b.path()).ensure_confidence_scores(StudentId(1)).unwrap();

    assert_eq!(left, right);
}

// =============================================================================
// Recommendations
// =============================================================================

#[test]
fn test_weak_student_is_sent_to_prerequisites() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());

    // Student 2 completed Variables only; Functions is gated on Loops.
    let recs = tracker.next_recommendations(StudentId(2)).unwrap();
    let topics: Vec<_> = recs.iter().map(|r| r.topic.as_str()).collect();

    assert!(topics.contains(&"Loops"));
    assert!(topics.contains(&"Functions"));
    assert!(topics.contains(&"Sorting"));
    assert!(!topics.contains(&"Closures"));

    let unique: HashSet<_> = topics.iter().collect();
    assert_eq!(unique.len(), topics.len());
    assert!(recs.windows(2).all(|w| w[0].confidence <= w[1].confidence));

    let functions = recs.iter().find(|r| r.topic == "Functions").unwrap();
    assert_eq!(functions.youtube, "https://youtube.com/functions");
    assert_eq!(functions.docs, "https://docs.example.com/functions");
}

#[test]
fn test_adaptive_advances_strong_topic() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());
    tracker.record_study(StudentId(1), "Functions", 85).unwrap();

    let adapted = tracker
        .adapt(StudentId(1), &[("Functions".to_string(), Confidence::new(85))])
        .unwrap();

    assert_eq!(adapted.len(), 1);
    assert_eq!(adapted[0].topic, "Closures");
    assert_eq!(adapted[0].strategy, Strategy::Advanced);
    assert_eq!(adapted[0].adapted_from.as_deref(), Some("Functions"));
    assert_eq!(adapted[0].docs, "https://docs.example.com/closures");
}

#[test]
fn test_adaptive_output_never_grows() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());

    for student in [1, 2, 3, 99].map(StudentId) {
        let base = tracker.next_recommendations(student).unwrap();
        let adapted = tracker.adapt(student, &base).unwrap();

        assert!(adapted.len() <= base.len());
        let unique: HashSet<_> = adapted.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(unique.len(), adapted.len());
        for record in &adapted {
            let from = record.adapted_from.as_deref().unwrap();
            assert!(base.iter().any(|r| r.topic == from));
        }
    }
}

// =============================================================================
// Study plans
// =============================================================================

#[test]
fn test_plan_persisted_and_exported() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());

    assert!(tracker.export_plan(&JsonPlanExport::default()).unwrap().is_none());

    let request = PlanRequest::parse("2024-01-01", "2", "3", ["A", "B", "C", "D"]).unwrap();
    let plan = tracker.create_plan(&request).unwrap();
    assert_eq!(plan.len(), 4);
    assert_eq!(plan[3].date.to_string(), "2024-01-04");

    let csv = fs::read_to_string(dir.path().join("study_plan.csv")).unwrap();
    assert!(csv.contains("2024-01-04,D,2"));

    let exported = tracker.export_plan(&JsonPlanExport::default()).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&exported).unwrap();
    assert_eq!(value[0]["date"], "2024-01-01");
    assert_eq!(value[0]["hours"], 2);

    // A reopened tracker sees the persisted plan.
    assert_eq!(open(dir.path()).current_plan().unwrap(), plan);
}

#[test]
fn test_weekly_layout_from_config() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let mut config = config(dir.path());
    config.planner.layout = PlanLayout::WeeklyReset;
    let tracker = Tracker::open(CsvStorage::new(config.data.clone()), config).unwrap();

    let request = PlanRequest::parse("2024-01-01", "1", "2", ["A", "B", "C"]).unwrap();
    let plan = tracker.create_plan(&request).unwrap();

    assert_eq!(plan[2].date.to_string(), "2024-01-08");
}

#[test]
fn test_invalid_plan_leaves_previous_plan() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());

    let request = PlanRequest::parse("2024-01-01", "2", "3", ["A"]).unwrap();
    tracker.create_plan(&request).unwrap();

    let bad = PlanRequest::parse("not-a-date", "2", "3", ["B"]);
    assert!(bad.is_err());
    assert_eq!(tracker.stored_plan().unwrap().unwrap()[0].topic, "A");
}

// =============================================================================
// Storage failures
// =============================================================================

#[test]
fn test_missing_table_fails_open() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    fs::remove_file(dir.path().join("resources.csv")).unwrap();

    let config = config(dir.path());
    let result = Tracker::open(CsvStorage::new(config.data.clone()), config);

    assert!(matches!(
        result,
        Err(TrackerError::Store(StoreError::Missing { .. }))
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_callers_do_not_duplicate_entries() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let tracker = open(dir.path());

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let tracker = &tracker;
            scope.spawn(move || {
                for _ in 0..5 {
                    let student = StudentId(1 + worker % 3);
                    tracker.next_recommendations(student).unwrap();
                    tracker.record_study(student, "Sorting", 1).unwrap();
                }
            });
        }
    });

    let history = CsvStorage::new(DataPaths::in_dir(dir.path())).load().unwrap().history;
    let pairs: HashSet<_> = history.iter().map(|e| (e.student_id, e.topic.clone())).collect();
    assert_eq!(pairs.len(), history.len());

    // Every session was kept: 40 sessions spread over three students.
    let sorting_total: u32 = history
        .iter()
        .filter(|e| e.topic == "Sorting")
        .map(|e| u32::from(e.confidence.value()))
        .sum();
    assert_eq!(sorting_total, 40);
}
