use std::{
    collections::BTreeMap,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use serde_json::{Map, Value};

use crate::{
    engine::{TableState, TransitionTableEngine},
    foundation::error::{TableError, TableResult},
    persist::{
        file::{ExportScope, export_records, read_rule_file, write_rule_file},
        load::{LoadSource, decode_save_data},
        save::{SaveSnapshot, encode_table_blob},
        schema::TABLE_KEY,
    },
    registry::rule_set::{RuleSet, RuleSetRegistry},
};

/// Outcome of [`TransitionTableEngine::load`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LoadReport {
    /// Stage of the fallback chain that produced the state.
    pub source: LoadSource,
    /// Live rules after loading.
    pub rules: usize,
    /// Rule sets after loading.
    pub sets: usize,
    /// Set that became current.
    pub current_set: String,
}

/// Marks an import/export in progress for as long as it is held.
#[derive(Debug)]
pub struct IoGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> IoGuard<'a> {
    /// Raise `flag`; fails with [`TableError::Busy`] when it is already raised.
    pub fn acquire(flag: &'a AtomicBool) -> TableResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| TableError::busy("another import/export is running"))?;
        Ok(Self { flag })
    }
}

impl Drop for IoGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl TransitionTableEngine {
    /// Replace all state with the contents of a saved collection.
    #[tracing::instrument(skip(self, data))]
    pub fn load(&self, data: &Map<String, Value>) -> LoadReport {
        let host = self.inner.host.as_ref();
        let main = host.main_canvas();
        let loaded = decode_save_data(data, host, &main, &self.inner.opts.default_set_name);

        let sets: Vec<RuleSet> = loaded
            .sets
            .iter()
            .map(|s| {
                let records = s
                    .records
                    .iter()
                    .filter(|r| r.is_storable())
                    .map(|r| r.clone().with_canvas(r.canvas_or(&main)))
                    .collect();
                RuleSet::with_records(s.name.clone(), records)
            })
            .collect();
        let registry = RuleSetRegistry::from_sets(
            sets,
            &loaded.default_set,
            &loaded.last_set,
            loaded.ignore_default,
        )
        .unwrap_or_else(|| RuleSetRegistry::new(self.inner.opts.default_set_name.clone()));

        // Drop everything tied to the previous collection before installing the new state.
        self.inner.bridge.lock().clear();
        let old_hotkeys: Vec<_> = {
            let mut st = self.inner.state.lock();
            let ids = st.registry.sets().iter().filter_map(|s| s.hotkey).collect();
            let mut fresh = TableState {
                table: Default::default(),
                registry,
                dialog: loaded.dialog,
            };
            let current = fresh.registry.current().records.clone();
            fresh.table.replace(&current, &main);
            *st = fresh;
            ids
        };
        for id in old_hotkeys {
            host.unregister_hotkey(id);
        }

        for name in self.set_names() {
            let binding = loaded
                .sets
                .iter()
                .find(|s| s.name == name)
                .and_then(|s| s.hotkey.as_ref());
            self.attach_set_hotkey(&name, binding);
        }
        if let Some(b) = &loaded.enable_hotkey {
            host.load_hotkey(self.inner.enable_hotkey, b);
        }
        if let Some(b) = &loaded.disable_hotkey {
            host.load_hotkey(self.inner.disable_hotkey, b);
        }

        let report = {
            let st = self.inner.state.lock();
            LoadReport {
                source: loaded.source,
                rules: st.table.len(),
                sets: st.registry.len(),
                current_set: st.registry.current_name().to_string(),
            }
        };
        tracing::info!(source = ?report.source, rules = report.rules, sets = report.sets, current = %report.current_set, "transition table loaded");
        self.enqueue_apply_all();
        report
    }

    /// Encode the `transition-table` object.
    #[tracing::instrument(skip(self))]
    pub fn save(&self) -> TableResult<Value> {
        let set_ids: Vec<_> = {
            let mut st = self.inner.state.lock();
            st.commit();
            st.registry
                .sets()
                .iter()
                .filter_map(|s| Some((s.name.clone(), s.hotkey?)))
                .collect()
        };
        let host = self.inner.host.as_ref();
        let set_hotkeys: BTreeMap<String, Value> = set_ids
            .into_iter()
            .filter_map(|(name, id)| Some((name, host.save_hotkey(id)?)))
            .collect();
        let enable_hotkey = host.save_hotkey(self.inner.enable_hotkey);
        let disable_hotkey = host.save_hotkey(self.inner.disable_hotkey);

        let blob = {
            let st = self.inner.state.lock();
            encode_table_blob(SaveSnapshot {
                records: st.table.records(),
                registry: &st.registry,
                dialog: st.dialog,
                dialog_floor: self.inner.opts.dialog_floor,
                enable_hotkey,
                disable_hotkey,
                set_hotkeys,
            })
        };
        serde_json::to_value(&blob).map_err(|e| TableError::serde(e.to_string()))
    }

    /// Write the `transition-table` object into a collection's save data.
    pub fn save_into(&self, data: &mut Map<String, Value>) -> TableResult<()> {
        let blob = self.save()?;
        data.insert(TABLE_KEY.to_string(), blob);
        Ok(())
    }

    /// Export the rules of `canvas` to a file; returns the number of rules written.
    #[tracing::instrument(skip(self))]
    pub fn export(&self, canvas: Option<&str>, path: &Path, scope: &ExportScope) -> TableResult<usize> {
        let _guard = IoGuard::acquire(&self.inner.io_busy)?;
        let canvas = self.canvas_or_main(canvas);
        let records = export_records(&self.inner.state.lock().table, &canvas, scope);
        let n = records.len();
        write_rule_file(path, records)?;
        tracing::info!(canvas = %canvas, rules = n, "exported rules");
        Ok(n)
    }

    /// Merge rules from a file into `canvas` (last write wins); returns the number imported.
    #[tracing::instrument(skip(self))]
    pub fn import(&self, canvas: Option<&str>, path: &Path) -> TableResult<usize> {
        let _guard = IoGuard::acquire(&self.inner.io_busy)?;
        let canvas = self.canvas_or_main(canvas);
        let records = read_rule_file(path)?;
        let n = self.inner.state.lock().table.extend(&records, &canvas);
        tracing::info!(canvas = %canvas, rules = n, "imported rules");
        self.enqueue_apply_all();
        Ok(n)
    }

    /// Whether an import/export is running.
    pub fn io_busy(&self) -> bool {
        self.inner.io_busy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/io.rs"]
mod tests;
