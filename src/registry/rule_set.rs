use crate::{
    foundation::error::{TableError, TableResult},
    host::HotkeyId,
    table::{lookup::TransitionTable, rule::RuleRecord},
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A named, independently switchable snapshot of transition rules.
pub struct RuleSet {
    /// Unique set name.
    pub name: String,
    /// Rules of this set. For the current set this is refreshed from the live table on commit.
    pub records: Vec<RuleRecord>,
    /// Host hotkey registered for switching to this set.
    pub hotkey: Option<HotkeyId>,
}

impl RuleSet {
    /// Create an empty set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
            hotkey: None,
        }
    }

    /// Create a set holding `records`.
    pub fn with_records(name: impl Into<String>, records: Vec<RuleRecord>) -> Self {
        Self {
            records,
            ..Self::new(name)
        }
    }
}

/// Ordered collection of [`RuleSet`]s with exactly one current set.
///
/// Invariants: names are unique, at least one set exists, `current` always names an existing set
/// and `default_set` is either empty or names an existing set. Failed operations leave the
/// registry unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSetRegistry {
    sets: Vec<RuleSet>,
    current: String,
    default_set: String,
    ignore_default: bool,
}

impl RuleSetRegistry {
    /// Registry holding a single empty set, which is current.
    pub fn new(initial: impl Into<String>) -> Self {
        let set = RuleSet::new(initial);
        let current = set.name.clone();
        Self {
            sets: vec![set],
            current,
            default_set: String::new(),
            ignore_default: false,
        }
    }

    /// Build a registry from loaded sets, picking the starting set.
    ///
    /// Starts on the default set when one is designated and not ignored, else on `last_set`,
    /// else on the first set. Duplicate names keep their first occurrence. Returns `None` when
    /// `sets` is empty.
    pub fn from_sets(
        sets: Vec<RuleSet>,
        default_set: &str,
        last_set: &str,
        ignore_default: bool,
    ) -> Option<Self> {
        let mut unique: Vec<RuleSet> = Vec::with_capacity(sets.len());
        for set in sets {
            if set.name.is_empty() || unique.iter().any(|s| s.name == set.name) {
                tracing::warn!(name = %set.name, "dropping rule set with empty or duplicate name");
                continue;
            }
            unique.push(set);
        }
        let first = unique.first()?.name.clone();

        let mut reg = Self {
            sets: unique,
            current: first,
            default_set: String::new(),
            ignore_default,
        };
        if reg.contains(default_set) {
            reg.default_set = default_set.to_string();
        }
        if !reg.ignore_default && !reg.default_set.is_empty() {
            reg.current = reg.default_set.clone();
        } else if reg.contains(last_set) {
            reg.current = last_set.to_string();
        }
        Some(reg)
    }

    /// Number of sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Always `false`: a registry keeps at least one set.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Sets in insertion order.
    pub fn sets(&self) -> &[RuleSet] {
        &self.sets
    }

    /// Set names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.name.as_str())
    }

    /// `true` when a set called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Look up a set by name.
    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.sets.iter().find(|s| s.name == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut RuleSet> {
        self.sets.iter_mut().find(|s| s.name == name)
    }

    /// Name of the current set.
    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// The current set.
    pub fn current(&self) -> &RuleSet {
        // `current` names an existing set by construction.
        &self.sets[self.index_of(&self.current).unwrap_or(0)]
    }

    /// Designated default set, if any.
    pub fn default_set(&self) -> Option<&str> {
        (!self.default_set.is_empty()).then_some(self.default_set.as_str())
    }

    /// Whether the default set is ignored when choosing a fallback set.
    pub fn ignore_default(&self) -> bool {
        self.ignore_default
    }

    /// Replace the stored records of the current set.
    pub fn commit(&mut self, records: Vec<RuleRecord>) {
        let idx = self.index_of(&self.current).unwrap_or(0);
        self.sets[idx].records = records;
    }

    /// Re-key scene `old` to `new` on `canvas` in every stored set except the current one.
    ///
    /// The current set is refreshed from the live table on commit instead. Records without a
    /// canvas belong to `main_canvas`. Collisions follow [`TransitionTable::rename_scene`].
    /// Returns the number of rules moved across all sets.
    pub fn rename_scene_in_stored(
        &mut self,
        canvas: &str,
        main_canvas: &str,
        old: &str,
        new: &str,
    ) -> usize {
        let current = &self.current;
        let mut moved = 0usize;
        for set in self.sets.iter_mut().filter(|s| s.name != *current) {
            let mut table = TransitionTable::new();
            table.replace(&set.records, main_canvas);
            let n = table.rename_scene(canvas, old, new);
            if n > 0 {
                set.records = table.records();
                moved += n;
            }
        }
        moved
    }

    /// Append a new empty set. It does not become current.
    pub fn add_set(&mut self, name: &str) -> TableResult<()> {
        self.check_new_name(name)?;
        self.sets.push(RuleSet::new(name));
        Ok(())
    }

    /// Append a copy of the current set's records under a fresh, non-colliding name.
    ///
    /// Candidate names are `"<current><suffix>"`, then `"<current><suffix> 2"`, `... 3`, and so on.
    pub fn duplicate_current(&mut self, suffix: &str) -> String {
        let base = format!("{}{}", self.current, suffix);
        let mut name = base.clone();
        let mut n = 2u32;
        while self.contains(&name) {
            name = format!("{base} {n}");
            n += 1;
        }
        let records = self.current().records.clone();
        self.sets.push(RuleSet::with_records(name.clone(), records));
        name
    }

    /// Rename a set in place, keeping its rules and hotkey.
    pub fn rename(&mut self, old: &str, new: &str) -> TableResult<()> {
        let idx = self
            .index_of(old)
            .ok_or_else(|| TableError::not_found(format!("rule set '{old}'")))?;
        if old == new {
            return Ok(());
        }
        self.check_new_name(new)?;

        self.sets[idx].name = new.to_string();
        if self.current == old {
            self.current = new.to_string();
        }
        if self.default_set == old {
            self.default_set = new.to_string();
        }
        Ok(())
    }

    /// Remove a set.
    ///
    /// Returns the removed set and, when it was current, the name of the set that became current.
    pub fn delete(&mut self, name: &str) -> TableResult<(RuleSet, Option<String>)> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| TableError::not_found(format!("rule set '{name}'")))?;
        if self.sets.len() == 1 {
            return Err(TableError::LastSet(name.to_string()));
        }

        let removed = self.sets.remove(idx);
        if self.default_set == name {
            self.default_set.clear();
        }
        if self.current != name {
            return Ok((removed, None));
        }

        self.current = match self.default_set() {
            Some(default) if !self.ignore_default => default.to_string(),
            _ => self.sets[0].name.clone(),
        };
        Ok((removed, Some(self.current.clone())))
    }

    /// Designate the default set; an empty name clears it.
    pub fn set_default(&mut self, name: &str) -> TableResult<()> {
        if !name.is_empty() && !self.contains(name) {
            return Err(TableError::not_found(format!("rule set '{name}'")));
        }
        self.default_set = name.to_string();
        Ok(())
    }

    /// Toggle whether the default set is ignored.
    pub fn set_ignore_default(&mut self, ignore: bool) {
        self.ignore_default = ignore;
    }

    /// Make `name` current. Returns `false` when it already was.
    pub fn set_current(&mut self, name: &str) -> TableResult<bool> {
        if !self.contains(name) {
            return Err(TableError::not_found(format!("rule set '{name}'")));
        }
        if self.current == name {
            return Ok(false);
        }
        self.current = name.to_string();
        Ok(true)
    }

    /// Name of the set bound to `hotkey`.
    pub fn set_for_hotkey(&self, hotkey: HotkeyId) -> Option<&str> {
        self.sets
            .iter()
            .find(|s| s.hotkey == Some(hotkey))
            .map(|s| s.name.as_str())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.sets.iter().position(|s| s.name == name)
    }

    fn check_new_name(&self, name: &str) -> TableResult<()> {
        if name.trim().is_empty() {
            return Err(TableError::validation("rule set name must be non-empty"));
        }
        if self.contains(name) {
            return Err(TableError::name_collision(name));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/rule_set.rs"]
mod tests;
