use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

#[test]
fn dropping_subscription_disconnects() {
    let host = MemoryHost::new("Main");
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let sub = host.connect_transition_start(
        "Main",
        "Fade",
        Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }),
    );
    assert_eq!(host.connection_count("Main"), 1);
    assert_eq!(host.start_transition("Fade"), 1);
    assert_eq!(host.start_transition("Cut"), 0);

    drop(sub);
    assert_eq!(host.connection_count("Main"), 0);
    assert_eq!(host.start_transition("Fade"), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn collection_scenes_and_private_settings_are_imported() {
    let collection = serde_json::json!({
        "current_scene": "Intro",
        "sources": [
            { "name": "Intro", "id": "scene", "private_settings": { "transition": "Fade", "transition_duration": 700 } },
            { "name": "Outro", "versioned_id": "scene" },
            { "name": "Mic", "id": "wasapi_input_capture" }
        ]
    });
    let host = MemoryHost::from_collection(collection.as_object().unwrap(), "Main");
    assert_eq!(host.scenes("Main"), vec!["Intro", "Outro"]);
    assert_eq!(host.current_scene("Main").as_deref(), Some("Intro"));
    assert_eq!(
        host.private_string("Intro", "transition").as_deref(),
        Some("Fade")
    );
    assert_eq!(host.private_int("Intro", "transition_duration"), Some(700));
    assert_eq!(host.private_string("Outro", "transition"), None);
}

#[test]
fn write_collection_updates_private_settings() {
    let mut collection = serde_json::json!({
        "sources": [ { "name": "Intro", "id": "scene", "private_settings": { "transition": "Fade" } } ]
    });
    let host = MemoryHost::from_collection(collection.as_object().unwrap(), "Main");
    host.erase_private("Intro", "transition");
    host.set_private_int("Intro", "transition_duration", 10);
    host.write_collection(collection.as_object_mut().unwrap());
    assert_eq!(
        collection["sources"][0]["private_settings"],
        serde_json::json!({ "transition_duration": 10 })
    );
}

#[test]
fn rename_carries_settings_and_current() {
    let host = MemoryHost::new("Main");
    host.add_scene("Main", "A");
    host.set_current_scene("Main", "A");
    host.set_private_string("A", "transition", "Cut");
    host.rename_scene("Main", "A", "B");
    assert_eq!(host.scenes("Main"), vec!["B"]);
    assert_eq!(host.current_scene("Main").as_deref(), Some("B"));
    assert_eq!(host.private_string("B", "transition").as_deref(), Some("Cut"));
}

#[test]
fn hotkey_bindings_round_trip() {
    let host = MemoryHost::new("Main");
    let id = host.register_hotkey("transition-table.enable", "Enable");
    assert_eq!(host.save_hotkey(id), None);
    host.load_hotkey(id, &serde_json::json!([{ "key": "OBS_KEY_F1" }]));
    assert_eq!(
        host.save_hotkey(id),
        Some(serde_json::json!([{ "key": "OBS_KEY_F1" }]))
    );
    assert_eq!(host.hotkey_by_name("transition-table.enable"), Some(id));
    host.unregister_hotkey(id);
    assert!(host.hotkeys().is_empty());
}
