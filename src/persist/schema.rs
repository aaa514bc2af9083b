use serde::Deserialize as _;
use serde_json::{Map, Value};

use crate::{foundation::core::DurationMs, table::rule::RuleRecord};

/// Key of this engine's object inside the host's save data.
pub const TABLE_KEY: &str = "transition-table";
/// Key of the legacy matrix plugin's object inside the host's save data.
pub const MATRIX_KEY: &str = "obs-transition-matrix";

pub(crate) const SET_TABLE_PREFIX: &str = "table_set_";
pub(crate) const SET_HOTKEY_PREFIX: &str = "hotkey_set_";

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// The `transition-table` object of a saved collection.
///
/// Per-set tables and hotkeys live under dynamic `table_set_<name>` / `hotkey_set_<name>` keys,
/// collected in `extra`.
pub struct TableBlob {
    #[serde(
        default,
        deserialize_with = "lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub dialog_width: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub dialog_height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_hotkey: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_hotkey: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_record_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub transitions: Option<Vec<RuleRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setname_array: Option<Vec<SetName>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableBlob {
    pub(crate) fn set_table(&self, name: &str) -> Option<&Value> {
        self.extra.get(&format!("{SET_TABLE_PREFIX}{name}"))
    }

    pub(crate) fn set_hotkey(&self, name: &str) -> Option<&Value> {
        self.extra.get(&format!("{SET_HOTKEY_PREFIX}{name}"))
    }
}

/// Parse a rule list, dropping individual malformed records instead of the whole list.
pub(crate) fn lenient_records(value: &Value, context: &str) -> Vec<RuleRecord> {
    let Some(items) = value.as_array() else {
        tracing::warn!(context, "rule table is not an array; treating as empty");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<RuleRecord>(item.clone()) {
            Ok(rec) => Some(rec),
            Err(e) => {
                tracing::warn!(context, error = %e, "skipping malformed rule record");
                None
            }
        })
        .collect()
}

fn lenient_record_list<'de, D>(de: D) -> Result<Option<Vec<RuleRecord>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw.map(|v| lenient_records(&v, "transitions")))
}

/// Any JSON number, truncated toward zero; other shapes read as absent.
fn lenient_int<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw.and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Entry of `setname_array`.
pub struct SetName {
    #[serde(default)]
    pub setname: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Legacy `obs-transition-matrix` object: one row per source scene.
pub struct MatrixBlob {
    #[serde(default)]
    pub matrix: Vec<MatrixRow>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Legacy matrix row.
pub struct MatrixRow {
    #[serde(default)]
    pub scene: String,
    #[serde(default)]
    pub data: Vec<MatrixCell>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Legacy matrix cell; sparse, empty cells carry no rule.
pub struct MatrixCell {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub transition: String,
    #[serde(default)]
    pub duration: DurationMs,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Import/export file: `{ "transitions": [ ... ] }`.
pub struct RuleFile {
    /// Rules of one canvas, without canvas fields.
    #[serde(default)]
    pub transitions: Vec<RuleRecord>,
}
