use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::host::{HotkeyId, Host, Subscription, TransitionStartFn};

#[derive(Default)]
struct CanvasState {
    scenes: Vec<String>,
    current: Option<String>,
}

struct Connection {
    canvas: String,
    transition: String,
    on_start: Arc<TransitionStartFn>,
}

#[derive(Default)]
struct HostState {
    main_canvas: String,
    canvases: BTreeMap<String, CanvasState>,
    settings: HashMap<String, Map<String, Value>>,
    hotkeys: BTreeMap<HotkeyId, (String, Option<Value>)>,
    next_hotkey: u64,
    connections: BTreeMap<u64, Connection>,
    next_connection: u64,
}

/// In-memory [`Host`] for tests, tooling and offline edits of saved scene collections.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl MemoryHost {
    /// Host with a single, empty main canvas.
    pub fn new(main_canvas: impl Into<String>) -> Self {
        let main_canvas = main_canvas.into();
        let mut state = HostState {
            main_canvas: main_canvas.clone(),
            ..HostState::default()
        };
        state.canvases.insert(main_canvas, CanvasState::default());
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Build a host from a saved scene collection.
    ///
    /// Every source whose `id` (or `versioned_id`) is `"scene"` becomes a scene of the main
    /// canvas, carrying its `private_settings`; `current_scene` becomes the active scene.
    pub fn from_collection(collection: &Map<String, Value>, main_canvas: &str) -> Self {
        let host = Self::new(main_canvas);
        let sources = collection
            .get("sources")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for source in sources {
            let kind = source
                .get("versioned_id")
                .or_else(|| source.get("id"))
                .and_then(Value::as_str);
            let Some(name) = source.get("name").and_then(Value::as_str) else {
                continue;
            };
            if kind != Some("scene") {
                continue;
            }
            host.add_scene(main_canvas, name);
            if let Some(private) = source.get("private_settings").and_then(Value::as_object) {
                host.state
                    .lock()
                    .settings
                    .insert(name.to_string(), private.clone());
            }
        }
        if let Some(current) = collection.get("current_scene").and_then(Value::as_str) {
            host.set_current_scene(main_canvas, current);
        }
        host
    }

    /// Write each scene's private settings back into a saved scene collection.
    pub fn write_collection(&self, collection: &mut Map<String, Value>) {
        let state = self.state.lock();
        let Some(sources) = collection.get_mut("sources").and_then(Value::as_array_mut) else {
            return;
        };
        for source in sources {
            let Some(obj) = source.as_object_mut() else {
                continue;
            };
            let Some(name) = obj.get("name").and_then(Value::as_str) else {
                continue;
            };
            if let Some(private) = state.settings.get(name) {
                obj.insert("private_settings".to_string(), Value::Object(private.clone()));
            }
        }
    }

    /// Add an empty canvas.
    pub fn add_canvas(&self, canvas: &str) {
        self.state
            .lock()
            .canvases
            .entry(canvas.to_string())
            .or_default();
    }

    /// Add a scene to `canvas`, creating the canvas if needed.
    pub fn add_scene(&self, canvas: &str, scene: &str) {
        let mut state = self.state.lock();
        let c = state.canvases.entry(canvas.to_string()).or_default();
        if !c.scenes.iter().any(|s| s == scene) {
            c.scenes.push(scene.to_string());
        }
    }

    /// Make `scene` the active scene of `canvas`.
    pub fn set_current_scene(&self, canvas: &str, scene: &str) {
        let mut state = self.state.lock();
        state.canvases.entry(canvas.to_string()).or_default().current = Some(scene.to_string());
    }

    /// Rename a scene, carrying its private settings along.
    pub fn rename_scene(&self, canvas: &str, old: &str, new: &str) {
        let mut state = self.state.lock();
        if let Some(c) = state.canvases.get_mut(canvas) {
            for s in c.scenes.iter_mut().filter(|s| s.as_str() == old) {
                *s = new.to_string();
            }
            if c.current.as_deref() == Some(old) {
                c.current = Some(new.to_string());
            }
        }
        if let Some(settings) = state.settings.remove(old) {
            state.settings.insert(new.to_string(), settings);
        }
    }

    /// Fire the transition-start signal of `transition`; returns how many callbacks ran.
    pub fn start_transition(&self, transition: &str) -> usize {
        let callbacks: Vec<Arc<TransitionStartFn>> = self
            .state
            .lock()
            .connections
            .values()
            .filter(|c| c.transition == transition)
            .map(|c| Arc::clone(&c.on_start))
            .collect();
        for cb in &callbacks {
            cb();
        }
        callbacks.len()
    }

    /// Number of live transition-start connections on `canvas`.
    pub fn connection_count(&self, canvas: &str) -> usize {
        self.state
            .lock()
            .connections
            .values()
            .filter(|c| c.canvas == canvas)
            .count()
    }

    /// Snapshot of a scene's private settings.
    pub fn private_settings(&self, scene: &str) -> Map<String, Value> {
        self.state
            .lock()
            .settings
            .get(scene)
            .cloned()
            .unwrap_or_default()
    }

    /// Registered hotkey names with their bindings.
    pub fn hotkeys(&self) -> Vec<(HotkeyId, String, Option<Value>)> {
        self.state
            .lock()
            .hotkeys
            .iter()
            .map(|(id, (name, binding))| (*id, name.clone(), binding.clone()))
            .collect()
    }

    /// Id of the hotkey registered under `name`.
    pub fn hotkey_by_name(&self, name: &str) -> Option<HotkeyId> {
        self.state
            .lock()
            .hotkeys
            .iter()
            .find(|(_, (n, _))| n == name)
            .map(|(id, _)| *id)
    }

    /// Bind a hotkey to a key combination blob.
    pub fn bind_hotkey(&self, id: HotkeyId, binding: Value) {
        if let Some(entry) = self.state.lock().hotkeys.get_mut(&id) {
            entry.1 = Some(binding);
        }
    }
}

impl Host for MemoryHost {
    fn main_canvas(&self) -> String {
        self.state.lock().main_canvas.clone()
    }

    fn canvases(&self) -> Vec<String> {
        self.state.lock().canvases.keys().cloned().collect()
    }

    fn scenes(&self, canvas: &str) -> Vec<String> {
        self.state
            .lock()
            .canvases
            .get(canvas)
            .map(|c| c.scenes.clone())
            .unwrap_or_default()
    }

    fn current_scene(&self, canvas: &str) -> Option<String> {
        self.state.lock().canvases.get(canvas)?.current.clone()
    }

    fn private_string(&self, scene: &str, key: &str) -> Option<String> {
        let state = self.state.lock();
        state
            .settings
            .get(scene)?
            .get(key)?
            .as_str()
            .map(str::to_string)
    }

    fn private_int(&self, scene: &str, key: &str) -> Option<i64> {
        self.state.lock().settings.get(scene)?.get(key)?.as_i64()
    }

    fn set_private_string(&self, scene: &str, key: &str, value: &str) {
        self.state
            .lock()
            .settings
            .entry(scene.to_string())
            .or_default()
            .insert(key.to_string(), Value::from(value));
    }

    fn set_private_int(&self, scene: &str, key: &str, value: i64) {
        self.state
            .lock()
            .settings
            .entry(scene.to_string())
            .or_default()
            .insert(key.to_string(), Value::from(value));
    }

    fn erase_private(&self, scene: &str, key: &str) {
        if let Some(settings) = self.state.lock().settings.get_mut(scene) {
            settings.remove(key);
        }
    }

    fn connect_transition_start(
        &self,
        canvas: &str,
        transition: &str,
        on_start: TransitionStartFn,
    ) -> Subscription {
        let id = {
            let mut state = self.state.lock();
            let id = state.next_connection;
            state.next_connection += 1;
            state.connections.insert(
                id,
                Connection {
                    canvas: canvas.to_string(),
                    transition: transition.to_string(),
                    on_start: Arc::new(on_start),
                },
            );
            id
        };
        let weak = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.lock().connections.remove(&id);
            }
        })
    }

    fn register_hotkey(&self, name: &str, _description: &str) -> HotkeyId {
        let mut state = self.state.lock();
        state.next_hotkey += 1;
        let id = HotkeyId(state.next_hotkey);
        state.hotkeys.insert(id, (name.to_string(), None));
        id
    }

    fn unregister_hotkey(&self, id: HotkeyId) {
        self.state.lock().hotkeys.remove(&id);
    }

    fn save_hotkey(&self, id: HotkeyId) -> Option<Value> {
        self.state.lock().hotkeys.get(&id)?.1.clone()
    }

    fn load_hotkey(&self, id: HotkeyId, binding: &Value) {
        self.bind_hotkey(id, binding.clone());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/memory.rs"]
mod tests;
