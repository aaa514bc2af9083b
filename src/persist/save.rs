use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    foundation::core::DialogSize,
    persist::schema::{SET_HOTKEY_PREFIX, SET_TABLE_PREFIX, SetName, TableBlob},
    registry::rule_set::RuleSetRegistry,
    table::rule::RuleRecord,
};

/// Engine state captured for saving.
///
/// Hotkey bindings are resolved through the host before encoding, so the snapshot carries blobs
/// rather than ids.
#[derive(Debug)]
pub struct SaveSnapshot<'a> {
    /// Live table records, every canvas, with canvas fields.
    pub records: Vec<RuleRecord>,
    /// Registry whose current set already holds `records`.
    pub registry: &'a RuleSetRegistry,
    /// Current editor dialog size.
    pub dialog: Option<DialogSize>,
    /// Sizes at or below this floor are not persisted.
    pub dialog_floor: DialogSize,
    /// Enable hotkey binding.
    pub enable_hotkey: Option<Value>,
    /// Disable hotkey binding.
    pub disable_hotkey: Option<Value>,
    /// Per-set hotkey bindings keyed by set name.
    pub set_hotkeys: BTreeMap<String, Value>,
}

/// Build the `transition-table` object from a snapshot.
pub fn encode_table_blob(snapshot: SaveSnapshot<'_>) -> TableBlob {
    let mut blob = TableBlob {
        transitions: Some(snapshot.records),
        enable_hotkey: snapshot.enable_hotkey,
        disable_hotkey: snapshot.disable_hotkey,
        default_set: Some(
            snapshot
                .registry
                .default_set()
                .unwrap_or_default()
                .to_string(),
        ),
        last_set: Some(snapshot.registry.current_name().to_string()),
        ignore_default: Some(snapshot.registry.ignore_default()),
        ..TableBlob::default()
    };

    if let Some(size) = snapshot.dialog.filter(|d| d.exceeds(snapshot.dialog_floor)) {
        blob.dialog_width = Some(i64::from(size.width));
        blob.dialog_height = Some(i64::from(size.height));
    }

    let mut names = Vec::with_capacity(snapshot.registry.len());
    for set in snapshot.registry.sets() {
        names.push(SetName {
            setname: set.name.clone(),
        });
        let records = set
            .records
            .iter()
            .filter_map(|r| serde_json::to_value(r).ok())
            .collect();
        blob.extra.insert(
            format!("{SET_TABLE_PREFIX}{}", set.name),
            Value::Array(records),
        );
        if let Some(binding) = snapshot.set_hotkeys.get(&set.name) {
            blob.extra.insert(
                format!("{SET_HOTKEY_PREFIX}{}", set.name),
                binding.clone(),
            );
        }
    }
    blob.setname_array = Some(names);
    blob
}

#[cfg(test)]
#[path = "../../tests/unit/persist/save.rs"]
mod tests;
