use super::*;
use crate::{foundation::core::DurationMs, host::memory::MemoryHost};

fn scenes(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn table() -> TransitionTable {
    let mut t = TransitionTable::new();
    t.set_rule("Main", "Intro", "Any", TransitionRule::new("Stinger", DurationMs(800)))
        .unwrap();
    t.set_rule("Main", "Any", "Outro", TransitionRule::new("Fade", DurationMs(1200)))
        .unwrap();
    t
}

#[test]
fn plan_resolves_against_current_scene() {
    let plan = plan_overrides(
        &table(),
        "Main",
        Some("Intro"),
        &scenes(&["Intro", "Game", "Outro"]),
    )
    .unwrap();
    assert_eq!(plan.len(), 3);
    assert!(
        plan.iter()
            .all(|p| p.rule.as_ref().unwrap().transition == "Stinger")
    );

    let plan = plan_overrides(&table(), "Main", Some("Game"), &scenes(&["Intro", "Outro"])).unwrap();
    assert_eq!(plan[0].rule, None);
    assert_eq!(plan[1].rule.as_ref().unwrap().transition, "Fade");
}

#[test]
fn plan_without_current_scene_uses_wildcard_bucket() {
    let plan = plan_overrides(&table(), "Main", None, &scenes(&["Outro"])).unwrap();
    assert_eq!(plan[0].rule.as_ref().unwrap().duration, DurationMs(1200));
}

#[test]
fn untouched_canvas_is_skipped() {
    assert!(plan_overrides(&table(), "Vertical", Some("Intro"), &scenes(&["A"])).is_none());
}

#[test]
fn write_sets_and_erases_both_keys() {
    let host = MemoryHost::new("Main");
    host.set_private_string("Game", TRANSITION_KEY, "Old");
    host.set_private_int("Game", DURATION_KEY, 5);

    let plan = vec![
        SceneOverride {
            scene: "Outro".to_string(),
            rule: Some(TransitionRule::new("Fade", DurationMs(1200))),
        },
        SceneOverride {
            scene: "Game".to_string(),
            rule: None,
        },
    ];
    write_overrides(&host, &plan);

    assert_eq!(
        host.private_string("Outro", TRANSITION_KEY).as_deref(),
        Some("Fade")
    );
    assert_eq!(host.private_int("Outro", DURATION_KEY), Some(1200));
    assert!(host.private_settings("Game").is_empty());
}

#[test]
fn clear_touches_every_scene_of_canvas() {
    let host = MemoryHost::new("Main");
    for s in ["A", "B"] {
        host.add_scene("Main", s);
        host.set_private_string(s, TRANSITION_KEY, "Cut");
    }
    assert_eq!(clear_overrides(&host, "Main"), 2);
    assert_eq!(host.private_string("A", TRANSITION_KEY), None);
    assert_eq!(host.private_string("B", TRANSITION_KEY), None);
}
