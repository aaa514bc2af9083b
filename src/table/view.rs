use std::collections::{BTreeSet, HashSet};

use crate::{
    foundation::core::{WILDCARD, is_wildcard},
    table::lookup::TransitionTable,
    table::rule::TransitionRule,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Whether a rule key refers to something that currently exists.
pub enum RuleStatus {
    /// The `"Any"` wildcard.
    Wildcard,
    /// A scene that exists in the host.
    Live,
    /// A scene the host no longer knows (stale rule).
    Missing,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// One listed rule with presentation flags.
pub struct RuleRow {
    /// Source scene key.
    pub from_scene: String,
    /// Destination scene key.
    pub to_scene: String,
    /// Stored rule.
    pub rule: TransitionRule,
    /// Status of the source key.
    pub from_status: RuleStatus,
    /// Status of the destination key.
    pub to_status: RuleStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Case-insensitive substring filters for [`TransitionTable::rows`]. Empty filters match all.
pub struct RowFilter {
    /// Filter on the source scene key.
    pub from: String,
    /// Filter on the destination scene key.
    pub to: String,
}

impl RowFilter {
    fn matches(needle: &str, key: &str) -> bool {
        needle.is_empty() || key.to_lowercase().contains(&needle.to_lowercase())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// Square grid of exact rules over every scene mentioned by a canvas, `"Any"` first.
pub struct TransitionMatrix {
    /// Row and column labels.
    pub scenes: Vec<String>,
    /// `cells[row][col]` is the rule stored for `scenes[row] -> scenes[col]`.
    pub cells: Vec<Vec<Option<TransitionRule>>>,
}

impl TransitionMatrix {
    /// Exact rule for `from -> to`, if both are labels of this matrix.
    pub fn cell(&self, from: &str, to: &str) -> Option<&TransitionRule> {
        let row = self.scenes.iter().position(|s| s == from)?;
        let col = self.scenes.iter().position(|s| s == to)?;
        self.cells[row][col].as_ref()
    }
}

impl TransitionTable {
    /// List the rules of `canvas` that pass `filter`, flagging keys absent from `live_scenes`.
    pub fn rows(&self, canvas: &str, filter: &RowFilter, live_scenes: &[String]) -> Vec<RuleRow> {
        let Some(froms) = self.from_buckets(canvas) else {
            return Vec::new();
        };
        let live: HashSet<&str> = live_scenes.iter().map(String::as_str).collect();
        let status = |key: &str| {
            if is_wildcard(key) {
                RuleStatus::Wildcard
            } else if live.contains(key) {
                RuleStatus::Live
            } else {
                RuleStatus::Missing
            }
        };

        let mut out = Vec::new();
        for (from, tos) in froms {
            if !RowFilter::matches(&filter.from, from) {
                continue;
            }
            for (to, rule) in tos {
                if !RowFilter::matches(&filter.to, to) {
                    continue;
                }
                out.push(RuleRow {
                    from_scene: from.clone(),
                    to_scene: to.clone(),
                    rule: rule.clone(),
                    from_status: status(from),
                    to_status: status(to),
                });
            }
        }
        out
    }

    /// Build the from/to matrix of `canvas`.
    pub fn matrix(&self, canvas: &str) -> TransitionMatrix {
        let mut names = BTreeSet::new();
        if let Some(froms) = self.from_buckets(canvas) {
            for (from, tos) in froms {
                names.insert(from.as_str());
                names.extend(tos.keys().map(String::as_str));
            }
        }
        names.remove(WILDCARD);

        let scenes: Vec<String> = std::iter::once(WILDCARD)
            .chain(names)
            .map(str::to_string)
            .collect();
        let cells = scenes
            .iter()
            .map(|from| {
                scenes
                    .iter()
                    .map(|to| self.get(canvas, from, to).cloned())
                    .collect()
            })
            .collect();
        TransitionMatrix { scenes, cells }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/table/view.rs"]
mod tests;
