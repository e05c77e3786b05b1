//! The working collection of rules for one editing session

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::rule::{AdjustmentRule, RuleKey};

/// Heading for rules that were given no category
pub const UNCATEGORIZED: &str = "other";

/// Outcome of adding a batch of rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub added: usize,
    /// Pairs that were already present and left untouched
    pub skipped: usize,
}

impl GenerationReport {
    pub fn total(&self) -> usize {
        self.added + self.skipped
    }
}

impl std::ops::AddAssign for GenerationReport {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.skipped += other.skipped;
    }
}

/// Rules in insertion order, at most one per ordered character pair.
///
/// The first rule generated for a pair wins; later rules for the same
/// pair are dropped, not merged.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<AdjustmentRule>,
    keys: HashSet<RuleKey>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `rule` unless its pair is already present. Returns true if added.
    pub fn insert(&mut self, rule: AdjustmentRule) -> bool {
        if !self.keys.insert(rule.key()) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    pub fn extend(&mut self, rules: impl IntoIterator<Item = AdjustmentRule>) -> GenerationReport {
        let mut report = GenerationReport::default();
        for rule in rules {
            if self.insert(rule) {
                report.added += 1;
            } else {
                report.skipped += 1;
            }
        }
        report
    }

    pub fn get(&self, key: RuleKey) -> Option<&AdjustmentRule> {
        self.rules.iter().find(|rule| rule.key() == key)
    }

    fn get_mut(&mut self, key: RuleKey) -> Option<&mut AdjustmentRule> {
        self.rules.iter_mut().find(|rule| rule.key() == key)
    }

    pub fn contains(&self, key: RuleKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn remove(&mut self, key: RuleKey) -> Option<AdjustmentRule> {
        if !self.keys.remove(&key) {
            return None;
        }
        let position = self.rules.iter().position(|rule| rule.key() == key)?;
        Some(self.rules.remove(position))
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.keys.clear();
    }

    pub fn set_selected(&mut self, key: RuleKey, selected: bool) -> bool {
        match self.get_mut(key) {
            Some(rule) => {
                rule.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn set_placement(&mut self, key: RuleKey, x: f64, y: f64) -> bool {
        match self.get_mut(key) {
            Some(rule) => {
                rule.x_placement = x;
                rule.y_placement = y;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        self.rules.iter_mut().for_each(|rule| rule.selected = true);
    }

    pub fn deselect_all(&mut self) {
        self.rules.iter_mut().for_each(|rule| rule.selected = false);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdjustmentRule> {
        self.rules.iter()
    }

    pub fn selected(&self) -> impl Iterator<Item = &AdjustmentRule> {
        self.rules.iter().filter(|rule| rule.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules grouped by category, categories in sorted order
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&AdjustmentRule>> {
        let mut groups: BTreeMap<&str, Vec<&AdjustmentRule>> = BTreeMap::new();
        for rule in &self.rules {
            let category = if rule.category.is_empty() {
                UNCATEGORIZED
            } else {
                rule.category.as_str()
            };
            groups.entry(category).or_default().push(rule);
        }
        groups
    }
}
