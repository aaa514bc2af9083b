use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    foundation::error::{TableError, TableResult},
    persist::schema::RuleFile,
    table::{lookup::TransitionTable, rule::RuleRecord},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Which rules of a canvas an export writes.
pub enum ExportScope {
    /// Every rule of the canvas.
    #[default]
    Whole,
    /// Only the listed `(from, to)` pairs that hold a rule.
    ///
    /// An empty selection, or one that matches no rule, exports the whole canvas.
    Selected(Vec<(String, String)>),
}

/// Collect the records of `canvas` covered by `scope`, without canvas fields.
pub fn export_records(table: &TransitionTable, canvas: &str, scope: &ExportScope) -> Vec<RuleRecord> {
    let all = table.canvas_records(canvas);
    let ExportScope::Selected(pairs) = scope else {
        return all;
    };
    let picked: Vec<RuleRecord> = all
        .iter()
        .filter(|r| {
            pairs
                .iter()
                .any(|(from, to)| *from == r.from_scene && *to == r.to_scene)
        })
        .cloned()
        .collect();
    if picked.is_empty() { all } else { picked }
}

/// Write `records` as a `{ "transitions": [...] }` file.
pub fn write_rule_file(path: &Path, records: Vec<RuleRecord>) -> TableResult<()> {
    let file = File::create(path)
        .map_err(|e| TableError::io(format!("create '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &RuleFile { transitions: records })
        .map_err(|e| TableError::serde(format!("encode '{}': {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| TableError::io(format!("write '{}': {e}", path.display())))?;
    Ok(())
}

/// Read the records of a `{ "transitions": [...] }` file.
///
/// Canvas fields inside the file are dropped: the caller chooses the target canvas.
pub fn read_rule_file(path: &Path) -> TableResult<Vec<RuleRecord>> {
    let file = File::open(path)
        .map_err(|e| TableError::io(format!("open '{}': {e}", path.display())))?;
    let parsed: RuleFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| TableError::serde(format!("decode '{}': {e}", path.display())))?;
    Ok(parsed
        .transitions
        .into_iter()
        .map(|mut r| {
            r.canvas = None;
            r
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/persist/file.rs"]
mod tests;
