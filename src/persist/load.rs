use serde_json::{Map, Value};

use crate::{
    foundation::core::{DialogSize, DurationMs, WILDCARD},
    host::{DURATION_KEY, Host, TRANSITION_KEY},
    persist::schema::{MATRIX_KEY, MatrixBlob, TABLE_KEY, TableBlob, lenient_records},
    table::rule::RuleRecord,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Which stage of the load fallback chain produced the state.
pub enum LoadSource {
    /// Current format with named rule sets.
    RuleSets,
    /// Current format with a flat rule list.
    FlatTable,
    /// Legacy transition-matrix grid (possibly merged with scene settings).
    LegacyMatrix,
    /// Per-scene transition settings predating this engine.
    SceneSettings,
    /// Nothing recognizable was found.
    Empty,
}

#[derive(Clone, Debug, PartialEq)]
/// A rule set as read from save data.
pub struct LoadedSet {
    /// Set name.
    pub name: String,
    /// Stored rules.
    pub records: Vec<RuleRecord>,
    /// Saved hotkey binding of the set.
    pub hotkey: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
/// Everything recovered from save data, before it is installed into an engine.
pub struct LoadedState {
    /// Stage that produced this state.
    pub source: LoadSource,
    /// Rule sets in saved order; never empty.
    pub sets: Vec<LoadedSet>,
    /// Designated default set (may be empty).
    pub default_set: String,
    /// Set that was current when saved (may be empty).
    pub last_set: String,
    /// Whether the default set is ignored.
    pub ignore_default: bool,
    /// Saved editor dialog size.
    pub dialog: Option<DialogSize>,
    /// Saved binding of the enable hotkey.
    pub enable_hotkey: Option<Value>,
    /// Saved binding of the disable hotkey.
    pub disable_hotkey: Option<Value>,
}

impl LoadedState {
    fn single(source: LoadSource, set_name: &str, records: Vec<RuleRecord>) -> Self {
        Self {
            source,
            sets: vec![LoadedSet {
                name: set_name.to_string(),
                records,
                hotkey: None,
            }],
            default_set: String::new(),
            last_set: String::new(),
            ignore_default: false,
            dialog: None,
            enable_hotkey: None,
            disable_hotkey: None,
        }
    }

    /// Total number of records across every set.
    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(|s| s.records.len()).sum()
    }
}

/// Decode save data, falling back through every known format.
///
/// Order: named sets, flat rule list, legacy matrix, per-scene settings scan. Once a
/// `transition-table` object decodes, the legacy stages are skipped even if it holds no rules:
/// they are a one-time migration path. Both legacy stages run together, matrix first, so scene
/// settings win on overlapping `Any -> scene` cells.
pub fn decode_save_data(
    data: &Map<String, Value>,
    host: &dyn Host,
    main_canvas: &str,
    default_set_name: &str,
) -> LoadedState {
    if let Some(raw) = data.get(TABLE_KEY) {
        match serde_json::from_value::<TableBlob>(raw.clone()) {
            Ok(blob) => return decode_table_blob(&blob, default_set_name),
            Err(e) => tracing::warn!(error = %e, "malformed '{TABLE_KEY}' data; trying legacy formats"),
        }
    }

    let mut records = Vec::new();
    let mut source = LoadSource::Empty;

    if let Some(raw) = data.get(MATRIX_KEY) {
        match serde_json::from_value::<MatrixBlob>(raw.clone()) {
            Ok(matrix) => {
                records.extend(matrix_records(&matrix));
                source = LoadSource::LegacyMatrix;
            }
            Err(e) => tracing::warn!(error = %e, "malformed '{MATRIX_KEY}' data; ignoring"),
        }
    }

    let scanned = scene_setting_records(host, main_canvas);
    if source == LoadSource::Empty && !scanned.is_empty() {
        source = LoadSource::SceneSettings;
    }
    records.extend(scanned);

    LoadedState::single(source, default_set_name, records)
}

fn decode_table_blob(blob: &TableBlob, default_set_name: &str) -> LoadedState {
    let sets: Vec<LoadedSet> = blob
        .setname_array
        .iter()
        .flatten()
        .filter(|s| !s.setname.is_empty())
        .map(|s| LoadedSet {
            name: s.setname.clone(),
            records: blob
                .set_table(&s.setname)
                .map(|v| lenient_records(v, &s.setname))
                .unwrap_or_default(),
            hotkey: blob.set_hotkey(&s.setname).cloned(),
        })
        .collect();

    let mut state = if sets.is_empty() {
        LoadedState::single(
            LoadSource::FlatTable,
            default_set_name,
            blob.transitions.clone().unwrap_or_default(),
        )
    } else {
        LoadedState {
            sets,
            default_set: blob.default_set.clone().unwrap_or_default(),
            last_set: blob.last_set.clone().unwrap_or_default(),
            ignore_default: blob.ignore_default.unwrap_or(false),
            ..LoadedState::single(LoadSource::RuleSets, default_set_name, Vec::new())
        }
    };

    state.dialog = match (blob.dialog_width, blob.dialog_height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(DialogSize::new(
            u32::try_from(w).unwrap_or(u32::MAX),
            u32::try_from(h).unwrap_or(u32::MAX),
        )),
        _ => None,
    };
    state.enable_hotkey = blob.enable_hotkey.clone();
    state.disable_hotkey = blob.disable_hotkey.clone();
    state
}

fn matrix_records(matrix: &MatrixBlob) -> Vec<RuleRecord> {
    matrix
        .matrix
        .iter()
        .filter(|row| !row.scene.is_empty())
        .flat_map(|row| {
            row.data
                .iter()
                .filter(|cell| !cell.to.is_empty())
                .map(|cell| RuleRecord::new(&row.scene, &cell.to, &cell.transition, cell.duration))
        })
        .collect()
}

fn scene_setting_records(host: &dyn Host, main_canvas: &str) -> Vec<RuleRecord> {
    host.scenes(main_canvas)
        .into_iter()
        .filter_map(|scene| {
            let transition = host.private_string(&scene, TRANSITION_KEY)?;
            if transition.is_empty() {
                return None;
            }
            let duration =
                DurationMs::from_i64(host.private_int(&scene, DURATION_KEY).unwrap_or(0));
            Some(RuleRecord::new(WILDCARD, scene, transition, duration))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/persist/load.rs"]
mod tests;
