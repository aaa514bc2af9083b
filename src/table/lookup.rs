use std::collections::BTreeMap;

use crate::{
    foundation::core::WILDCARD,
    foundation::error::{TableError, TableResult},
    table::rule::{RuleRecord, TransitionRule},
};

type ToBucket = BTreeMap<String, TransitionRule>;
type FromBucket = BTreeMap<String, ToBucket>;

/// Rules keyed by `canvas -> from-scene -> to-scene`, with `"Any"` wildcard fallback.
///
/// Canvas entries survive until [`TransitionTable::clear`] even when their last rule is erased:
/// an existing-but-empty canvas still gets its overrides cleared on the next synchronization,
/// while a canvas that never had rules is left untouched. Empty from-buckets are pruned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionTable {
    canvases: BTreeMap<String, FromBucket>,
}

impl TransitionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rules across every canvas.
    pub fn len(&self) -> usize {
        self.canvases
            .values()
            .flat_map(|froms| froms.values())
            .map(|tos| tos.len())
            .sum()
    }

    /// `true` when no rule is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when `canvas` has (or had, since the last clear) rules.
    pub fn has_canvas(&self, canvas: &str) -> bool {
        self.canvases.contains_key(canvas)
    }

    /// Canvas names known to the table, sorted.
    pub fn canvases(&self) -> impl Iterator<Item = &str> {
        self.canvases.keys().map(String::as_str)
    }

    /// Exact lookup without wildcard fallback.
    pub fn get(&self, canvas: &str, from: &str, to: &str) -> Option<&TransitionRule> {
        self.canvases.get(canvas)?.get(from)?.get(to)
    }

    /// Resolve the rule that applies when switching `from -> to` on `canvas`.
    ///
    /// Precedence: `from->to`, `from->Any`, `Any->to`, `Any->Any`.
    pub fn resolve(&self, canvas: &str, from: &str, to: &str) -> Option<&TransitionRule> {
        let froms = self.canvases.get(canvas)?;
        let lookup = |bucket: &str| {
            let tos = froms.get(bucket)?;
            tos.get(to).or_else(|| tos.get(WILDCARD))
        };
        lookup(from).or_else(|| lookup(WILDCARD))
    }

    /// Insert or replace the rule at `(canvas, from, to)`, returning the previous rule.
    ///
    /// An empty transition name is rejected: "no rule" is expressed by erasing.
    pub fn set_rule(
        &mut self,
        canvas: &str,
        from: &str,
        to: &str,
        rule: TransitionRule,
    ) -> TableResult<Option<TransitionRule>> {
        if canvas.is_empty() {
            return Err(TableError::validation("canvas name must be non-empty"));
        }
        if from.is_empty() || to.is_empty() {
            return Err(TableError::validation(
                "from-scene and to-scene must be non-empty",
            ));
        }
        if rule.transition.is_empty() {
            return Err(TableError::validation(
                "transition name must be non-empty (erase the rule instead)",
            ));
        }
        Ok(self
            .canvases
            .entry(canvas.to_string())
            .or_default()
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), rule))
    }

    /// Remove the rule at `(canvas, from, to)` if present.
    pub fn erase_rule(&mut self, canvas: &str, from: &str, to: &str) -> Option<TransitionRule> {
        self.try_erase_rule(canvas, from, to).ok()
    }

    /// Remove the rule at `(canvas, from, to)`, naming the missing path segment on failure.
    pub fn try_erase_rule(
        &mut self,
        canvas: &str,
        from: &str,
        to: &str,
    ) -> TableResult<TransitionRule> {
        let froms = self
            .canvases
            .get_mut(canvas)
            .ok_or_else(|| TableError::not_found("Canvas not found in table"))?;
        let tos = froms
            .get_mut(from)
            .ok_or_else(|| TableError::not_found("'from_scene' not found in table"))?;
        let removed = tos
            .remove(to)
            .ok_or_else(|| TableError::not_found("'to_scene' not found for this 'from_scene'"))?;
        if tos.is_empty() {
            froms.remove(from);
        }
        Ok(removed)
    }

    /// Re-key every rule referencing scene `old` on `canvas` to `new`.
    ///
    /// The `old` from-bucket is merged into `new` and every `old` to-entry is moved to `new`; on a
    /// collision the moved rule overwrites the existing one. Returns the number of rules moved.
    pub fn rename_scene(&mut self, canvas: &str, old: &str, new: &str) -> usize {
        if old == new || new.is_empty() {
            return 0;
        }
        let Some(froms) = self.canvases.get_mut(canvas) else {
            return 0;
        };

        let mut moved = 0usize;
        if let Some(bucket) = froms.remove(old) {
            moved += bucket.len();
            froms.entry(new.to_string()).or_default().extend(bucket);
        }
        for tos in froms.values_mut() {
            if let Some(rule) = tos.remove(old) {
                tos.insert(new.to_string(), rule);
                moved += 1;
            }
        }
        moved
    }

    /// Drop every canvas and rule.
    pub fn clear(&mut self) {
        self.canvases.clear();
    }

    /// Keep an (possibly empty) entry for `canvas` so its overrides are still synchronized.
    pub(crate) fn ensure_canvas(&mut self, canvas: &str) {
        if !canvas.is_empty() {
            self.canvases.entry(canvas.to_string()).or_default();
        }
    }

    /// Flat records for every rule, each tagged with its canvas.
    pub fn records(&self) -> Vec<RuleRecord> {
        let mut out = Vec::with_capacity(self.len());
        for (canvas, froms) in &self.canvases {
            for (from, tos) in froms {
                for (to, rule) in tos {
                    out.push(
                        RuleRecord::new(from, to, &rule.transition, rule.duration)
                            .with_canvas(canvas),
                    );
                }
            }
        }
        out
    }

    /// Flat records for one canvas, without the canvas field.
    pub fn canvas_records(&self, canvas: &str) -> Vec<RuleRecord> {
        let Some(froms) = self.canvases.get(canvas) else {
            return Vec::new();
        };
        froms
            .iter()
            .flat_map(|(from, tos)| {
                tos.iter()
                    .map(move |(to, rule)| RuleRecord::new(from, to, &rule.transition, rule.duration))
            })
            .collect()
    }

    /// Merge records into the table (last write wins), returning how many were stored.
    ///
    /// Records without a canvas land on `default_canvas`; records with an empty key or
    /// transition are skipped.
    pub fn extend<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a RuleRecord>,
        default_canvas: &str,
    ) -> usize {
        let mut stored = 0usize;
        for rec in records {
            if !rec.is_storable() {
                tracing::debug!(?rec, "skipping record without scene keys or transition");
                continue;
            }
            let canvas = rec.canvas_or(default_canvas);
            if self
                .set_rule(canvas, &rec.from_scene, &rec.to_scene, rec.rule())
                .is_ok()
            {
                stored += 1;
            }
        }
        stored
    }

    /// Replace the whole table with `records`.
    pub fn replace<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a RuleRecord>,
        default_canvas: &str,
    ) -> usize {
        self.clear();
        self.extend(records, default_canvas)
    }

    pub(crate) fn from_buckets(&self, canvas: &str) -> Option<&FromBucket> {
        self.canvases.get(canvas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/table/lookup.rs"]
mod tests;
