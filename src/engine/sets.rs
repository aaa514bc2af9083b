use std::sync::atomic::Ordering;

use crate::{
    engine::TransitionTableEngine,
    foundation::error::{TableError, TableResult},
    host::HotkeyId,
};

const SET_HOTKEY_PREFIX: &str = "transition-table.set.";

impl TransitionTableEngine {
    /// Rule set names in insertion order.
    pub fn set_names(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .registry
            .names()
            .map(str::to_string)
            .collect()
    }

    /// Name of the current rule set.
    pub fn current_set(&self) -> String {
        self.inner.state.lock().registry.current_name().to_string()
    }

    /// Designated default set, if any.
    pub fn default_set(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .registry
            .default_set()
            .map(str::to_string)
    }

    /// Whether the default set is ignored.
    pub fn ignore_default(&self) -> bool {
        self.inner.state.lock().registry.ignore_default()
    }

    /// Hotkey switching to set `name`.
    pub fn set_hotkey(&self, name: &str) -> Option<HotkeyId> {
        self.inner.state.lock().registry.get(name)?.hotkey
    }

    /// Create an empty rule set and make it current.
    #[tracing::instrument(skip(self))]
    pub fn new_set(&self, name: &str) -> TableResult<()> {
        {
            let mut st = self.inner.state.lock();
            st.registry.add_set(name)?;
            st.commit();
            st.registry.set_current(name)?;
            let canvases: Vec<String> = st.table.canvases().map(str::to_string).collect();
            st.table.clear();
            for canvas in &canvases {
                st.table.ensure_canvas(canvas);
            }
        }
        self.attach_set_hotkey(name, None);
        tracing::info!(set = name, "rule set created");
        self.enqueue_apply_all();
        Ok(())
    }

    /// Copy the current set under a fresh name and make the copy current; returns its name.
    #[tracing::instrument(skip(self))]
    pub fn duplicate_set(&self) -> String {
        let name = {
            let mut st = self.inner.state.lock();
            st.commit();
            let name = st
                .registry
                .duplicate_current(&self.inner.opts.duplicate_suffix);
            // The copy holds the same rules, so the live table stays as is.
            if let Err(e) = st.registry.set_current(&name) {
                tracing::warn!(error = %e, "duplicated set vanished");
            }
            name
        };
        self.attach_set_hotkey(&name, None);
        tracing::info!(set = %name, "rule set duplicated");
        name
    }

    /// Rename the current set.
    #[tracing::instrument(skip(self))]
    pub fn rename_set(&self, new: &str) -> TableResult<()> {
        let (old, hotkey) = {
            let mut st = self.inner.state.lock();
            let old = st.registry.current_name().to_string();
            st.registry.rename(&old, new)?;
            let hotkey = st.registry.get(new).and_then(|s| s.hotkey);
            (old, hotkey)
        };
        if old == new {
            return Ok(());
        }
        // Hotkey names embed the set name; re-register and carry the binding over.
        let binding = hotkey.and_then(|id| {
            let b = self.inner.host.save_hotkey(id);
            self.inner.host.unregister_hotkey(id);
            b
        });
        self.attach_set_hotkey(new, binding.as_ref());
        tracing::info!(from = %old, to = new, "rule set renamed");
        Ok(())
    }

    /// Delete a set. When it was current, the fallback set is loaded into the live table.
    #[tracing::instrument(skip(self))]
    pub fn delete_set(&self, name: &str) -> TableResult<()> {
        let main = self.inner.host.main_canvas();
        let (removed, switched) = {
            let mut st = self.inner.state.lock();
            let (removed, switched) = st.registry.delete(name)?;
            if let Some(target) = &switched {
                Self::load_set_locked(&mut st, target, &main);
            }
            (removed, switched)
        };
        if let Some(id) = removed.hotkey {
            self.inner.host.unregister_hotkey(id);
        }
        if let Some(target) = switched {
            tracing::info!(deleted = name, current = %target, "deleted current rule set");
            self.enqueue_apply_all();
        }
        Ok(())
    }

    /// Designate the default set; an empty name clears it.
    pub fn set_default(&self, name: &str) -> TableResult<()> {
        self.inner.state.lock().registry.set_default(name)
    }

    /// Toggle whether the default set is ignored.
    pub fn set_ignore_default(&self, ignore: bool) {
        self.inner.state.lock().registry.set_ignore_default(ignore);
    }

    /// Make `name` current: commit the live table into the current set, then load the target.
    ///
    /// Returns `false` when `name` already was current.
    #[tracing::instrument(skip(self))]
    pub fn switch_set(&self, name: &str) -> TableResult<bool> {
        self.switch_set_gated(name, false)
    }

    pub(crate) fn on_set_hotkey(&self, id: HotkeyId) -> bool {
        if self.inner.io_busy.load(Ordering::SeqCst) {
            tracing::debug!(?id, "import/export in progress; ignoring set hotkey");
            return false;
        }
        let target = self
            .inner
            .state
            .lock()
            .registry
            .set_for_hotkey(id)
            .map(str::to_string);
        match target {
            Some(name) => self.switch_set_gated(&name, true).unwrap_or(false),
            None => false,
        }
    }

    /// Switch sets; with `yield_to_io` the switch is dropped when an import/export holds the
    /// [`IoGuard`](crate::engine::io::IoGuard). The flag is re-read under the state lock: an
    /// import that raised it before the switch locked merges into the set it started on.
    fn switch_set_gated(&self, name: &str, yield_to_io: bool) -> TableResult<bool> {
        let main = self.inner.host.main_canvas();
        {
            let mut st = self.inner.state.lock();
            if yield_to_io && self.inner.io_busy.load(Ordering::SeqCst) {
                tracing::debug!(set = name, "import/export started; dropping set switch");
                return Ok(false);
            }
            if !st.registry.contains(name) {
                return Err(TableError::not_found(format!("rule set '{name}'")));
            }
            if st.registry.current_name() == name {
                return Ok(false);
            }
            st.commit();
            st.registry.set_current(name)?;
            Self::load_set_locked(&mut st, name, &main);
        }
        tracing::info!(set = name, "switched rule set");
        self.enqueue_apply_all();
        Ok(true)
    }

    /// Replace the live table with set `name`'s snapshot, keeping existing canvas entries.
    fn load_set_locked(st: &mut super::TableState, name: &str, main: &str) {
        let canvases: Vec<String> = st.table.canvases().map(str::to_string).collect();
        let records = st
            .registry
            .get(name)
            .map(|s| s.records.clone())
            .unwrap_or_default();
        st.table.replace(&records, main);
        for canvas in &canvases {
            st.table.ensure_canvas(canvas);
        }
    }

    /// Register the switch hotkey of set `name`, optionally restoring a binding.
    pub(crate) fn attach_set_hotkey(&self, name: &str, binding: Option<&serde_json::Value>) {
        let host = &self.inner.host;
        let id = host.register_hotkey(
            &format!("{SET_HOTKEY_PREFIX}{name}"),
            &format!("Switch transition table to '{name}'"),
        );
        if let Some(binding) = binding {
            host.load_hotkey(id, binding);
        }
        let attached = match self.inner.state.lock().registry.get_mut(name) {
            Some(set) => {
                set.hotkey = Some(id);
                true
            }
            None => false,
        };
        if !attached {
            host.unregister_hotkey(id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/sets.rs"]
mod tests;
