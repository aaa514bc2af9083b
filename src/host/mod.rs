//! Collaborator interface to the embedding host application.
//!
//! The host owns canvases, scenes, transitions, hotkeys and the per-scene private settings store.
//! The engine only reaches it through [`Host`].

pub(crate) mod memory;

/// Private-settings key holding the overriding transition name.
pub const TRANSITION_KEY: &str = "transition";
/// Private-settings key holding the overriding transition duration in milliseconds.
pub const DURATION_KEY: &str = "transition_duration";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Host-assigned hotkey handle.
pub struct HotkeyId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
/// Source occupying an output channel.
pub struct SourceRef {
    /// Unique source name.
    pub name: String,
    /// `true` for transition-type sources.
    pub is_transition: bool,
}

impl SourceRef {
    /// A scene (non-transition) source.
    pub fn scene(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_transition: false,
        }
    }

    /// A transition source.
    pub fn transition(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_transition: true,
        }
    }
}

/// Callback invoked by the host when a subscribed transition starts playing.
///
/// May be called from any host thread.
pub type TransitionStartFn = Box<dyn Fn() + Send + Sync>;

/// Scoped signal connection; dropping it disconnects.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a disconnect action.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Services the engine consumes from the host.
///
/// Scene and canvas names are unique host-wide. Private-settings mutation is only performed from
/// the context that drains the engine's task queue.
pub trait Host: Send + Sync {
    /// Name of the main output canvas.
    fn main_canvas(&self) -> String;

    /// Every canvas name.
    fn canvases(&self) -> Vec<String>;

    /// Scenes belonging to `canvas`.
    fn scenes(&self, canvas: &str) -> Vec<String>;

    /// Scene currently feeding `canvas`; during a transition, the scene underlying it.
    fn current_scene(&self, canvas: &str) -> Option<String>;

    /// Read a private string setting of `scene`.
    fn private_string(&self, scene: &str, key: &str) -> Option<String>;

    /// Read a private integer setting of `scene`.
    fn private_int(&self, scene: &str, key: &str) -> Option<i64>;

    /// Write a private string setting of `scene`.
    fn set_private_string(&self, scene: &str, key: &str, value: &str);

    /// Write a private integer setting of `scene`.
    fn set_private_int(&self, scene: &str, key: &str, value: i64);

    /// Remove a private setting of `scene`.
    fn erase_private(&self, scene: &str, key: &str);

    /// Connect `on_start` to the transition-start signal of `transition` on `canvas`.
    fn connect_transition_start(
        &self,
        canvas: &str,
        transition: &str,
        on_start: TransitionStartFn,
    ) -> Subscription;

    /// Register a frontend hotkey.
    fn register_hotkey(&self, name: &str, description: &str) -> HotkeyId;

    /// Unregister a hotkey.
    fn unregister_hotkey(&self, id: HotkeyId);

    /// Serialize the key binding of a hotkey, if it has one.
    fn save_hotkey(&self, id: HotkeyId) -> Option<serde_json::Value>;

    /// Restore the key binding of a hotkey.
    fn load_hotkey(&self, id: HotkeyId, binding: &serde_json::Value);
}
