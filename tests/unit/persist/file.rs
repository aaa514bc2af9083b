use std::path::PathBuf;

use super::*;
use crate::{foundation::core::DurationMs, table::rule::TransitionRule};

fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "transition_table_file_{}_{}.json",
        tag,
        std::process::id()
    ))
}

fn table() -> TransitionTable {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "B", TransitionRule::new("Fade", DurationMs(300)))
        .unwrap();
    t.set_rule("Main", "Any", "C", TransitionRule::new("Cut", DurationMs(0)))
        .unwrap();
    t.set_rule("Vertical", "X", "Y", TransitionRule::new("Swipe", DurationMs(500)))
        .unwrap();
    t
}

#[test]
fn whole_scope_exports_one_canvas() {
    let recs = export_records(&table(), "Main", &ExportScope::Whole);
    assert_eq!(recs.len(), 2);
    assert!(recs.iter().all(|r| r.canvas.is_none()));
}

#[test]
fn selection_exports_only_existing_pairs() {
    let scope = ExportScope::Selected(vec![
        ("A".to_string(), "B".to_string()),
        ("A".to_string(), "Nope".to_string()),
    ]);
    let recs = export_records(&table(), "Main", &scope);
    assert_eq!(recs, vec![RuleRecord::new("A", "B", "Fade", DurationMs(300))]);
}

#[test]
fn empty_or_unmatched_selection_exports_whole_canvas() {
    let t = table();
    assert_eq!(export_records(&t, "Main", &ExportScope::Selected(Vec::new())).len(), 2);
    let scope = ExportScope::Selected(vec![("Q".to_string(), "R".to_string())]);
    assert_eq!(export_records(&t, "Main", &scope).len(), 2);
}

#[test]
fn file_round_trip_drops_canvas() {
    let path = temp_path("round_trip");
    let recs = vec![
        RuleRecord::new("A", "B", "Fade", DurationMs(300)).with_canvas("Vertical"),
        RuleRecord::new("Any", "Any", "Cut", DurationMs(0)),
    ];
    write_rule_file(&path, recs).unwrap();
    let back = read_rule_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(back.len(), 2);
    assert!(back.iter().all(|r| r.canvas.is_none()));
    assert_eq!(back[0].transition, "Fade");
}

#[test]
fn missing_file_is_io_error() {
    let err = read_rule_file(&temp_path("missing_never_written")).unwrap_err();
    assert!(matches!(err, TableError::Io(_)));
}

#[test]
fn invalid_json_is_serde_error() {
    let path = temp_path("invalid");
    std::fs::write(&path, b"{ not json").unwrap();
    let err = read_rule_file(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, TableError::Serde(_)));
}
