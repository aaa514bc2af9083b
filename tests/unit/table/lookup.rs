use super::*;
use crate::foundation::core::DurationMs;

fn rule(name: &str, ms: u32) -> TransitionRule {
    TransitionRule::new(name, DurationMs(ms))
}

fn blanket_table() -> TransitionTable {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "Any", "Any", rule("Fade", 300)).unwrap();
    t.set_rule("Main", "Scene1", "Any", rule("Cut", 0)).unwrap();
    t.set_rule("Main", "Any", "Scene3", rule("Stinger", 800))
        .unwrap();
    t
}

#[test]
fn set_then_resolve_returns_exact_rule() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "B", rule("Swipe", 450)).unwrap();
    assert_eq!(t.resolve("Main", "A", "B"), Some(&rule("Swipe", 450)));
    assert_eq!(t.get("Main", "A", "B"), Some(&rule("Swipe", 450)));
}

#[test]
fn from_specific_beats_to_specific() {
    let t = blanket_table();
    assert_eq!(t.resolve("Main", "Scene1", "Scene3"), Some(&rule("Cut", 0)));
    assert_eq!(
        t.resolve("Main", "Scene2", "Scene3"),
        Some(&rule("Stinger", 800))
    );
    assert_eq!(t.resolve("Main", "Scene2", "Scene4"), Some(&rule("Fade", 300)));
}

#[test]
fn erasing_most_specific_reveals_next_level() {
    let mut t = blanket_table();
    t.set_rule("Main", "Scene1", "Scene3", rule("Luma", 600))
        .unwrap();
    assert_eq!(t.resolve("Main", "Scene1", "Scene3"), Some(&rule("Luma", 600)));

    t.erase_rule("Main", "Scene1", "Scene3");
    assert_eq!(t.resolve("Main", "Scene1", "Scene3"), Some(&rule("Cut", 0)));

    t.erase_rule("Main", "Scene1", "Any");
    assert_eq!(
        t.resolve("Main", "Scene1", "Scene3"),
        Some(&rule("Stinger", 800))
    );

    t.erase_rule("Main", "Any", "Scene3");
    assert_eq!(t.resolve("Main", "Scene1", "Scene3"), Some(&rule("Fade", 300)));

    t.erase_rule("Main", "Any", "Any");
    assert_eq!(t.resolve("Main", "Scene1", "Scene3"), None);
}

#[test]
fn canvases_are_independent() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "Any", "Any", rule("Fade", 300)).unwrap();
    assert_eq!(t.resolve("Vertical", "A", "B"), None);
    assert_eq!(t.resolve("Main", "A", "B"), Some(&rule("Fade", 300)));
}

#[test]
fn empty_transition_is_rejected() {
    let mut t = TransitionTable::new();
    let err = t.set_rule("Main", "A", "B", rule("", 300)).unwrap_err();
    assert!(matches!(err, TableError::Validation(_)));
    assert!(t.is_empty());
    assert!(!t.has_canvas("Main"));
}

#[test]
fn erase_leaves_siblings_untouched() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "B", rule("Cut", 0)).unwrap();
    t.set_rule("Main", "A", "C", rule("Fade", 300)).unwrap();
    assert_eq!(t.erase_rule("Main", "A", "B"), Some(rule("Cut", 0)));
    assert_eq!(t.resolve("Main", "A", "B"), None);
    assert_eq!(t.resolve("Main", "A", "C"), Some(&rule("Fade", 300)));
    assert_eq!(t.erase_rule("Main", "A", "B"), None);
}

#[test]
fn erasing_last_rule_keeps_canvas_entry() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "B", rule("Cut", 0)).unwrap();
    t.erase_rule("Main", "A", "B");
    assert!(t.is_empty());
    assert!(t.has_canvas("Main"));
    assert!(t.from_buckets("Main").unwrap().is_empty());
}

#[test]
fn try_erase_names_missing_segment() {
    let mut t = TransitionTable::new();
    let err = t.try_erase_rule("Main", "A", "B").unwrap_err();
    assert_eq!(err.to_string(), "not found: Canvas not found in table");

    t.set_rule("Main", "A", "B", rule("Cut", 0)).unwrap();
    let err = t.try_erase_rule("Main", "X", "B").unwrap_err();
    assert!(err.to_string().contains("'from_scene' not found in table"));
    let err = t.try_erase_rule("Main", "A", "X").unwrap_err();
    assert!(
        err.to_string()
            .contains("'to_scene' not found for this 'from_scene'")
    );
}

#[test]
fn rename_moves_from_and_to_keys() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "B", rule("Cut", 0)).unwrap();
    t.set_rule("Main", "A", "Any", rule("Fade", 300)).unwrap();
    t.set_rule("Main", "C", "A", rule("Swipe", 500)).unwrap();
    t.set_rule("Main", "Any", "A", rule("Stinger", 800)).unwrap();

    let moved = t.rename_scene("Main", "A", "Z");
    assert_eq!(moved, 4);
    assert_eq!(t.len(), 4);
    assert_eq!(t.get("Main", "Z", "B"), Some(&rule("Cut", 0)));
    assert_eq!(t.get("Main", "Z", "Any"), Some(&rule("Fade", 300)));
    assert_eq!(t.get("Main", "C", "Z"), Some(&rule("Swipe", 500)));
    assert_eq!(t.get("Main", "Any", "Z"), Some(&rule("Stinger", 800)));
    assert!(t.records().iter().all(|r| r.from_scene != "A" && r.to_scene != "A"));
}

#[test]
fn rename_is_idempotent() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "B", rule("Cut", 0)).unwrap();
    t.rename_scene("Main", "A", "Z");
    let snapshot = t.clone();
    assert_eq!(t.rename_scene("Main", "A", "Z"), 0);
    assert_eq!(t, snapshot);
}

#[test]
fn rename_collision_overwrites_leaf() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "X", rule("Cut", 0)).unwrap();
    t.set_rule("Main", "B", "X", rule("Fade", 300)).unwrap();
    t.set_rule("Main", "B", "Y", rule("Luma", 400)).unwrap();
    t.set_rule("Main", "Any", "A", rule("Swipe", 500)).unwrap();
    t.set_rule("Main", "Any", "B", rule("Stinger", 800)).unwrap();

    let before = t.len();
    t.rename_scene("Main", "A", "B");
    // (B,X) collides in the from-bucket and (Any,B) collides in the to-position.
    assert_eq!(t.len(), before - 2);
    assert_eq!(t.get("Main", "B", "X"), Some(&rule("Cut", 0)));
    assert_eq!(t.get("Main", "B", "Y"), Some(&rule("Luma", 400)));
    assert_eq!(t.get("Main", "Any", "B"), Some(&rule("Swipe", 500)));
}

#[test]
fn rename_on_other_canvas_is_noop() {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "A", "B", rule("Cut", 0)).unwrap();
    assert_eq!(t.rename_scene("Vertical", "A", "Z"), 0);
    assert_eq!(t.get("Main", "A", "B"), Some(&rule("Cut", 0)));
}

#[test]
fn replace_skips_unstorable_records() {
    let mut t = blanket_table();
    let records = vec![
        RuleRecord::new("A", "B", "Cut", DurationMs(0)),
        RuleRecord::new("", "B", "Cut", DurationMs(0)),
        RuleRecord::new("A", "C", "", DurationMs(0)),
        RuleRecord::new("A", "D", "Fade", DurationMs(200)).with_canvas("Vertical"),
    ];
    assert_eq!(t.replace(&records, "Main"), 2);
    assert_eq!(t.len(), 2);
    assert_eq!(t.get("Main", "A", "B"), Some(&rule("Cut", 0)));
    assert_eq!(t.get("Vertical", "A", "D"), Some(&rule("Fade", 200)));
}

#[test]
fn records_round_trip_through_extend() {
    let t = blanket_table();
    let mut copy = TransitionTable::new();
    copy.extend(&t.records(), "Other");
    assert_eq!(copy, t);
    assert_eq!(t.canvas_records("Main").len(), 3);
    assert!(t.canvas_records("Main").iter().all(|r| r.canvas.is_none()));
}
