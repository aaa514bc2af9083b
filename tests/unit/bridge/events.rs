use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::host::memory::MemoryHost;

fn counter_cb(hits: &Arc<AtomicUsize>) -> impl FnOnce() -> TransitionStartFn {
    let hits = Arc::clone(hits);
    move || {
        Box::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }
}

#[test]
fn transition_on_channel_zero_is_subscribed_and_known() {
    let host = MemoryHost::new("Main");
    let hits = Arc::new(AtomicUsize::new(0));
    let mut bridge = EventBridge::default();

    let fade = SourceRef::transition("Fade");
    let refresh = bridge.channel_changed(&host, "Main", 0, Some(&fade), None, counter_cb(&hits));
    assert!(refresh);
    assert_eq!(bridge.watched_transition("Main"), Some("Fade"));
    assert_eq!(bridge.known("Main"), ["Fade".to_string()]);
    assert_eq!(host.connection_count("Main"), 1);

    host.start_transition("Fade");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn departing_transition_is_released() {
    let host = MemoryHost::new("Main");
    let hits = Arc::new(AtomicUsize::new(0));
    let mut bridge = EventBridge::default();
    let fade = SourceRef::transition("Fade");
    let scene = SourceRef::scene("Intro");

    bridge.channel_changed(&host, "Main", 0, Some(&fade), None, counter_cb(&hits));
    let refresh = bridge.channel_changed(&host, "Main", 0, Some(&scene), Some(&fade), counter_cb(&hits));
    assert!(refresh);
    assert_eq!(bridge.watched_transition("Main"), None);
    assert_eq!(host.connection_count("Main"), 0);
    // Known list survives the release.
    assert_eq!(bridge.known("Main").len(), 1);
}

#[test]
fn swapping_transitions_keeps_one_subscription() {
    let host = MemoryHost::new("Main");
    let hits = Arc::new(AtomicUsize::new(0));
    let mut bridge = EventBridge::default();
    let fade = SourceRef::transition("Fade");
    let cut = SourceRef::transition("Cut");

    bridge.channel_changed(&host, "Main", 0, Some(&fade), None, counter_cb(&hits));
    bridge.channel_changed(&host, "Main", 0, Some(&cut), Some(&fade), counter_cb(&hits));
    bridge.channel_changed(&host, "Main", 0, Some(&fade), Some(&cut), counter_cb(&hits));
    assert_eq!(host.connection_count("Main"), 1);
    assert_eq!(bridge.known("Main"), ["Fade".to_string(), "Cut".to_string()]);
}

#[test]
fn other_channels_are_ignored() {
    let host = MemoryHost::new("Main");
    let hits = Arc::new(AtomicUsize::new(0));
    let mut bridge = EventBridge::default();
    let fade = SourceRef::transition("Fade");
    assert!(!bridge.channel_changed(&host, "Main", 3, Some(&fade), None, counter_cb(&hits)));
    assert_eq!(host.connection_count("Main"), 0);
    assert!(bridge.known("Main").is_empty());
}

#[test]
fn empty_channel_does_not_request_refresh() {
    let host = MemoryHost::new("Main");
    let hits = Arc::new(AtomicUsize::new(0));
    let mut bridge = EventBridge::default();
    let scene = SourceRef::scene("Intro");
    assert!(!bridge.channel_changed(&host, "Main", 0, None, Some(&scene), counter_cb(&hits)));
}

#[test]
fn clear_drops_subscriptions() {
    let host = MemoryHost::new("Main");
    let hits = Arc::new(AtomicUsize::new(0));
    let mut bridge = EventBridge::default();
    let fade = SourceRef::transition("Fade");
    bridge.channel_changed(&host, "Main", 0, Some(&fade), None, counter_cb(&hits));
    bridge.clear();
    assert_eq!(host.connection_count("Main"), 0);
    assert!(bridge.known("Main").is_empty());
}
