use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::{engine::opts::EngineOpts, host::memory::MemoryHost};

fn engine() -> TransitionTableEngine {
    TransitionTableEngine::new(Arc::new(MemoryHost::new("Main")), EngineOpts::default())
}

#[test]
fn get_transition_resolves_with_fallback_and_defaults_to_empty() {
    let e = engine();
    e.set_rule(None, "Any", "B", "Cut", DurationMs(100)).unwrap();

    let hit = handle_request(&e, "get_transition", &json!({ "from_scene": "A", "to_scene": "B" }));
    assert_eq!(hit, json!({ "transition": "Cut", "duration": 100, "success": true }));

    let miss = handle_request(
        &e,
        "get_transition",
        &json!({ "canvas": "Vertical", "from_scene": "A", "to_scene": "B" }),
    );
    assert_eq!(miss, json!({ "transition": "", "duration": 0, "success": true }));
}

#[test]
fn set_transition_accepts_float_duration() {
    let e = engine();
    let resp = handle_request(
        &e,
        "set_transition",
        &json!({ "from_scene": "X", "to_scene": "Y", "transition": "Fade", "duration": 300.0 }),
    );
    assert_eq!(resp, json!({ "success": true }));
    assert_eq!(e.get_rule(None, "X", "Y").unwrap().duration, DurationMs(300));
}

#[test]
fn mistyped_field_only_loses_that_field() {
    let e = engine();
    let resp = handle_request(
        &e,
        "set_transition",
        &json!({ "canvas": 3, "from_scene": "X", "to_scene": "Y", "transition": "Cut", "duration": "slow" }),
    );
    assert_eq!(resp, json!({ "success": true }));
    let rule = e.get_rule(Some("Main"), "X", "Y").unwrap();
    assert_eq!(rule.transition, "Cut");
    assert_eq!(rule.duration, DurationMs::ZERO);
}

#[test]
fn set_transition_validates_keys() {
    let e = engine();
    assert_eq!(
        handle_request(&e, "set_transition", &json!({ "to_scene": "B" })),
        json!({ "success": false, "error": "'from_scene' not set" })
    );
    assert_eq!(
        handle_request(&e, "set_transition", &json!({ "from_scene": "A", "to_scene": "" })),
        json!({ "success": false, "error": "'to_scene' not set" })
    );
}

#[test]
fn set_then_delete_scenario() {
    let e = engine();
    let set = handle_request(
        &e,
        "set_transition",
        &json!({ "from_scene": "A", "to_scene": "B", "transition": "Fade", "duration": 300 }),
    );
    assert_eq!(set, json!({ "success": true }));
    assert_eq!(e.get_rule(Some("Main"), "A", "B").unwrap().transition, "Fade");

    let del = handle_request(&e, "set_transition", &json!({ "from_scene": "A", "to_scene": "B" }));
    assert_eq!(del, json!({ "success": true }));
    assert!(e.get_rule(None, "A", "B").is_none());

    let again = handle_request(&e, "set_transition", &json!({ "from_scene": "A", "to_scene": "B" }));
    assert_eq!(
        again,
        json!({ "success": false, "error": "'from_scene' not found in table" })
    );
}

#[test]
fn delete_reports_missing_path_segment() {
    let e = engine();
    let err = |payload| handle_request(&e, "set_transition", &payload)["error"].clone();
    assert_eq!(
        err(json!({ "from_scene": "A", "to_scene": "B" })),
        "Canvas not found in table"
    );
    e.set_rule(None, "A", "C", "Fade", DurationMs(300)).unwrap();
    assert_eq!(
        err(json!({ "from_scene": "A", "to_scene": "B", "transition": "" })),
        "'to_scene' not found for this 'from_scene'"
    );
}

#[test]
fn negative_duration_is_clamped() {
    let e = engine();
    handle_request(
        &e,
        "set_transition",
        &json!({ "from_scene": "A", "to_scene": "B", "transition": "Fade", "duration": -50 }),
    );
    assert_eq!(e.get_rule(None, "A", "B").unwrap().duration, DurationMs::ZERO);
}

#[test]
fn get_table_lists_every_canvas() {
    let e = engine();
    e.set_rule(None, "A", "B", "Fade", DurationMs(300)).unwrap();
    e.set_rule(Some("Vertical"), "X", "Any", "Cut", DurationMs(0))
        .unwrap();
    let resp = handle_request(&e, "get_table", &json!({}));
    assert_eq!(resp["success"], true);
    assert_eq!(
        resp["transitions"],
        json!([
            { "canvas": "Main", "from_scene": "A", "to_scene": "B", "transition": "Fade", "duration": 300 },
            { "canvas": "Vertical", "from_scene": "X", "to_scene": "Any", "transition": "Cut", "duration": 0 }
        ])
    );
}

#[test]
fn unknown_request_is_structured_failure() {
    let e = engine();
    assert_eq!(
        handle_request(&e, "get_everything", &json!({})),
        json!({ "success": false, "error": "unknown request 'get_everything'" })
    );
}

#[test]
fn procedure_returns_pair() {
    let e = engine();
    e.set_rule(None, "Any", "Any", "Swipe", DurationMs(500))
        .unwrap();
    assert_eq!(
        proc_get_transition_table_transition(&e, None, "X", "Y"),
        ("Swipe".to_string(), 500)
    );
    assert_eq!(
        proc_get_transition_table_transition(&e, Some("Other"), "X", "Y"),
        (String::new(), 0)
    );
}
