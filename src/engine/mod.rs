//! The [`TransitionTableEngine`] context object.
//!
//! Owns the live table, the rule-set registry, the event bridge and the synchronizer queue. All
//! table and registry state sits behind one mutex; host calls are made with it released.

pub(crate) mod io;
pub(crate) mod opts;
pub(crate) mod sets;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;

use crate::{
    bridge::events::{EventBridge, HostEvent},
    engine::opts::EngineOpts,
    foundation::core::{DialogSize, DurationMs},
    foundation::error::TableResult,
    host::{Host, HotkeyId, TransitionStartFn},
    registry::rule_set::RuleSetRegistry,
    sync::{
        overrides::{clear_overrides, plan_overrides, write_overrides},
        queue::{SyncTask, TaskQueue},
    },
    table::{
        lookup::TransitionTable,
        rule::{RuleRecord, TransitionRule},
        view::{RowFilter, RuleRow, TransitionMatrix},
    },
};

const ENABLE_HOTKEY: &str = "transition-table.enable";
const DISABLE_HOTKEY: &str = "transition-table.disable";

struct TableState {
    table: TransitionTable,
    registry: RuleSetRegistry,
    dialog: Option<DialogSize>,
}

impl TableState {
    fn fresh(default_set_name: &str) -> Self {
        Self {
            table: TransitionTable::new(),
            registry: RuleSetRegistry::new(default_set_name),
            dialog: None,
        }
    }

    /// Copy the live table into the current set's snapshot.
    fn commit(&mut self) {
        self.registry.commit(self.table.records());
    }
}

struct Inner {
    host: Arc<dyn Host>,
    opts: EngineOpts,
    state: Mutex<TableState>,
    bridge: Mutex<EventBridge>,
    queue: TaskQueue,
    enabled: Arc<AtomicBool>,
    io_busy: AtomicBool,
    enable_hotkey: HotkeyId,
    disable_hotkey: HotkeyId,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for id in self.state.get_mut().registry.sets().iter().filter_map(|s| s.hotkey) {
            self.host.unregister_hotkey(id);
        }
        self.host.unregister_hotkey(self.enable_hotkey);
        self.host.unregister_hotkey(self.disable_hotkey);
    }
}

/// Transition-table engine bound to one host.
///
/// Cheap to clone; clones share state. Mutations enqueue synchronizer work which the host drains
/// from its UI context with [`TransitionTableEngine::run_pending`].
#[derive(Clone)]
pub struct TransitionTableEngine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TransitionTableEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionTableEngine")
            .field("enabled", &self.is_enabled())
            .field("rules", &self.len())
            .field("pending", &self.inner.queue.len())
            .finish()
    }
}

impl TransitionTableEngine {
    /// Create an engine with one empty rule set and register its enable/disable hotkeys.
    pub fn new(host: Arc<dyn Host>, opts: EngineOpts) -> Self {
        let enable_hotkey = host.register_hotkey(ENABLE_HOTKEY, "Enable Transition Table");
        let disable_hotkey = host.register_hotkey(DISABLE_HOTKEY, "Disable Transition Table");
        let state = TableState::fresh(&opts.default_set_name);
        let enabled = Arc::new(AtomicBool::new(opts.enabled_on_start));
        let initial = opts.default_set_name.clone();
        let engine = Self {
            inner: Arc::new(Inner {
                host,
                opts,
                state: Mutex::new(state),
                bridge: Mutex::new(EventBridge::default()),
                queue: TaskQueue::new(),
                enabled,
                io_busy: AtomicBool::new(false),
                enable_hotkey,
                disable_hotkey,
            }),
        };
        engine.attach_set_hotkey(&initial, None);
        engine
    }

    /// The host this engine drives.
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.inner.host
    }

    /// Construction options.
    pub fn opts(&self) -> &EngineOpts {
        &self.inner.opts
    }

    /// `canvas`, or the host's main canvas when absent or empty.
    pub fn canvas_or_main(&self, canvas: Option<&str>) -> String {
        match canvas {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => self.inner.host.main_canvas(),
        }
    }

    /// Resolve the rule for `from -> to` with wildcard fallback.
    pub fn resolve(&self, canvas: Option<&str>, from: &str, to: &str) -> Option<TransitionRule> {
        let canvas = self.canvas_or_main(canvas);
        self.inner
            .state
            .lock()
            .table
            .resolve(&canvas, from, to)
            .cloned()
    }

    /// Exact rule stored for `from -> to`, without fallback.
    pub fn get_rule(&self, canvas: Option<&str>, from: &str, to: &str) -> Option<TransitionRule> {
        let canvas = self.canvas_or_main(canvas);
        self.inner
            .state
            .lock()
            .table
            .get(&canvas, from, to)
            .cloned()
    }

    /// Insert or replace a rule, returning the previous one.
    #[tracing::instrument(skip(self))]
    pub fn set_rule(
        &self,
        canvas: Option<&str>,
        from: &str,
        to: &str,
        transition: &str,
        duration: DurationMs,
    ) -> TableResult<Option<TransitionRule>> {
        let canvas = self.canvas_or_main(canvas);
        let prev = self.inner.state.lock().table.set_rule(
            &canvas,
            from,
            to,
            TransitionRule::new(transition, duration),
        )?;
        self.enqueue_apply(&canvas);
        Ok(prev)
    }

    /// Remove a rule if present.
    pub fn erase_rule(&self, canvas: Option<&str>, from: &str, to: &str) -> Option<TransitionRule> {
        self.try_erase_rule(canvas, from, to).ok()
    }

    /// Remove a rule, naming the missing path segment when it does not exist.
    #[tracing::instrument(skip(self))]
    pub fn try_erase_rule(
        &self,
        canvas: Option<&str>,
        from: &str,
        to: &str,
    ) -> TableResult<TransitionRule> {
        let canvas = self.canvas_or_main(canvas);
        let removed = self
            .inner
            .state
            .lock()
            .table
            .try_erase_rule(&canvas, from, to)?;
        self.enqueue_apply(&canvas);
        Ok(removed)
    }

    /// Re-key every rule of `canvas` from scene `old` to `new`, in the live table and in every
    /// stored rule set. Returns the number of moved rules.
    #[tracing::instrument(skip(self))]
    pub fn rename_scene(&self, canvas: &str, old: &str, new: &str) -> usize {
        let main = self.inner.host.main_canvas();
        let (live, stored) = {
            let mut st = self.inner.state.lock();
            let live = st.table.rename_scene(canvas, old, new);
            if live > 0 {
                st.commit();
            }
            let stored = st.registry.rename_scene_in_stored(canvas, &main, old, new);
            (live, stored)
        };
        if live + stored > 0 {
            tracing::debug!(live, stored, "scene rename propagated");
        }
        if live > 0 {
            self.enqueue_apply(canvas);
        }
        live + stored
    }

    /// Every live rule, tagged with its canvas.
    pub fn records(&self) -> Vec<RuleRecord> {
        self.inner.state.lock().table.records()
    }

    /// Number of live rules.
    pub fn len(&self) -> usize {
        self.inner.state.lock().table.len()
    }

    /// `true` when no rule is live.
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().table.is_empty()
    }

    /// Rules of `canvas` passing `filter`, with stale keys flagged against the host's scenes.
    pub fn rows(&self, canvas: Option<&str>, filter: &RowFilter) -> Vec<RuleRow> {
        let canvas = self.canvas_or_main(canvas);
        let live = self.inner.host.scenes(&canvas);
        self.inner.state.lock().table.rows(&canvas, filter, &live)
    }

    /// Grid view of the exact rules of `canvas`.
    pub fn matrix(&self, canvas: Option<&str>) -> TransitionMatrix {
        let canvas = self.canvas_or_main(canvas);
        self.inner.state.lock().table.matrix(&canvas)
    }

    /// Whether overrides are being applied.
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    /// Turn override application on or off.
    ///
    /// Disabling clears the overrides of every canvas; enabling re-applies them. Returns `false`
    /// when the flag already had that value.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        if self.inner.enabled.swap(enabled, Ordering::SeqCst) == enabled {
            return false;
        }
        tracing::info!(enabled, "transition table toggled");
        self.inner.queue.push(if enabled {
            SyncTask::ApplyAll
        } else {
            SyncTask::ClearAll
        });
        true
    }

    /// Id of the enable hotkey.
    pub fn enable_hotkey(&self) -> HotkeyId {
        self.inner.enable_hotkey
    }

    /// Id of the disable hotkey.
    pub fn disable_hotkey(&self) -> HotkeyId {
        self.inner.disable_hotkey
    }

    /// Dispatch a hotkey press. Returns `true` when the press was handled.
    pub fn on_hotkey(&self, id: HotkeyId, pressed: bool) -> bool {
        if !pressed {
            return false;
        }
        if id == self.inner.enable_hotkey {
            return self.set_enabled(true);
        }
        if id == self.inner.disable_hotkey {
            return self.set_enabled(false);
        }
        self.on_set_hotkey(id)
    }

    /// Last remembered editor dialog size.
    pub fn dialog_size(&self) -> Option<DialogSize> {
        self.inner.state.lock().dialog
    }

    /// Remember the editor dialog size.
    pub fn set_dialog_size(&self, size: DialogSize) {
        self.inner.state.lock().dialog = Some(size);
    }

    /// Transitions seen on `canvas`, in first-seen order.
    pub fn known_transitions(&self, canvas: Option<&str>) -> Vec<String> {
        let canvas = self.canvas_or_main(canvas);
        self.inner.bridge.lock().known(&canvas).to_vec()
    }

    /// Add transitions the host already offers on `canvas` to its known list.
    pub fn seed_known_transitions<'a>(
        &self,
        canvas: Option<&str>,
        names: impl IntoIterator<Item = &'a str>,
    ) {
        let canvas = self.canvas_or_main(canvas);
        let mut bridge = self.inner.bridge.lock();
        for name in names {
            bridge.record_known(&canvas, name);
        }
    }

    /// Transition currently watched on channel 0 of `canvas`.
    pub fn watched_transition(&self, canvas: Option<&str>) -> Option<String> {
        let canvas = self.canvas_or_main(canvas);
        self.inner
            .bridge
            .lock()
            .watched_transition(&canvas)
            .map(str::to_string)
    }

    /// React to a host lifecycle signal.
    #[tracing::instrument(skip(self))]
    pub fn handle_event(&self, event: HostEvent) {
        match event {
            HostEvent::ChannelChanged {
                canvas,
                channel,
                source,
                prev_source,
            } => {
                let refresh = self.inner.bridge.lock().channel_changed(
                    self.inner.host.as_ref(),
                    &canvas,
                    channel,
                    source.as_ref(),
                    prev_source.as_ref(),
                    || self.transition_start_callback(&canvas),
                );
                if refresh {
                    self.enqueue_apply(&canvas);
                }
            }
            HostEvent::TransitionStarted { canvas } => self.enqueue_apply(&canvas),
            HostEvent::SceneChanged => {
                let main = self.inner.host.main_canvas();
                self.enqueue_apply(&main);
            }
            HostEvent::SourceRenamed {
                canvas: Some(canvas),
                prev_name,
                new_name,
            } => {
                self.rename_scene(&canvas, &prev_name, &new_name);
            }
            HostEvent::SourceRenamed { canvas: None, .. } => {
                tracing::debug!("ignoring rename of a source outside any canvas");
            }
            HostEvent::CollectionCleanup | HostEvent::Exit => self.reset(),
        }
    }

    /// Number of synchronizer tasks waiting to run.
    pub fn pending_tasks(&self) -> usize {
        self.inner.queue.len()
    }

    /// Drain the synchronizer queue and write overrides. Call from the host's UI context.
    ///
    /// Returns the number of (coalesced) tasks executed.
    #[tracing::instrument(skip(self))]
    pub fn run_pending(&self) -> usize {
        let tasks = self.inner.queue.drain();
        for task in &tasks {
            tracing::debug!(?task, "run synchronizer task");
            match task {
                SyncTask::ClearAll => {
                    for canvas in self.inner.host.canvases() {
                        clear_overrides(self.inner.host.as_ref(), &canvas);
                    }
                }
                SyncTask::ApplyAll if self.is_enabled() => {
                    for canvas in self.inner.host.canvases() {
                        self.apply_canvas(&canvas);
                    }
                }
                SyncTask::Apply(canvas) if self.is_enabled() => self.apply_canvas(canvas),
                SyncTask::ApplyAll | SyncTask::Apply(_) => {
                    tracing::debug!("engine disabled; skipping apply");
                }
            }
        }
        tasks.len()
    }

    fn apply_canvas(&self, canvas: &str) {
        let host = self.inner.host.as_ref();
        let from = host.current_scene(canvas);
        let scenes = host.scenes(canvas);
        let plan = {
            let st = self.inner.state.lock();
            plan_overrides(&st.table, canvas, from.as_deref(), &scenes)
        };
        match plan {
            Some(plan) => write_overrides(host, &plan),
            None => tracing::debug!(canvas, "canvas has no rules; leaving overrides untouched"),
        }
    }

    pub(crate) fn enqueue_apply(&self, canvas: &str) {
        if self.is_enabled() {
            self.inner.queue.push(SyncTask::Apply(canvas.to_string()));
        }
    }

    pub(crate) fn enqueue_apply_all(&self) {
        if self.is_enabled() {
            self.inner.queue.push(SyncTask::ApplyAll);
        }
    }

    fn transition_start_callback(&self, canvas: &str) -> TransitionStartFn {
        let sender = self.inner.queue.sender();
        let enabled = Arc::clone(&self.inner.enabled);
        let canvas = canvas.to_string();
        Box::new(move || {
            if enabled.load(Ordering::SeqCst) {
                sender.push(SyncTask::Apply(canvas.clone()));
            }
        })
    }

    /// Forget everything tied to the current scene collection.
    fn reset(&self) {
        self.inner.bridge.lock().clear();
        let hotkeys: Vec<HotkeyId> = {
            let mut st = self.inner.state.lock();
            let ids = st.registry.sets().iter().filter_map(|s| s.hotkey).collect();
            *st = TableState::fresh(&self.inner.opts.default_set_name);
            ids
        };
        for id in hotkeys {
            self.inner.host.unregister_hotkey(id);
        }
        self.attach_set_hotkey(&self.inner.opts.default_set_name, None);
        let dropped = self.inner.queue.drain().len();
        tracing::info!(dropped, "transition table state cleared");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/mod.rs"]
mod tests;
