use std::collections::{BTreeMap, HashMap};

use crate::key::RecordKey;
use crate::record::{KeyedRecord, Record};

/// One journal entry: sparse column overrides for the record identified by
/// `base_key`. The entry's slot in the overlay map is its *current* key; a
/// reassignment moves the slot while `base_key` stays fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationEntry {
    base_key: RecordKey,
    overrides: BTreeMap<String, String>,
}

impl ModificationEntry {
    fn new(base_key: RecordKey) -> Self {
        Self {
            base_key,
            overrides: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn base_key(&self) -> &RecordKey {
        &self.base_key
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.overrides.get(column).map(String::as_str)
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides
            .iter()
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }

    fn set(&mut self, column: &str, value: &str) {
        self.overrides.insert(column.to_string(), value.to_string());
    }

    fn apply_to(&self, record: &mut Record) {
        for (column, value) in &self.overrides {
            record.set(column, value);
        }
    }
}

/// Journal of partial edits keyed by current record identity. Entries are
/// kept in key order so application is deterministic even when a stale key
/// produced a second entry for the same base record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModificationOverlay {
    entries: BTreeMap<RecordKey, ModificationEntry>,
}

impl ModificationOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one column override, creating the entry (with `base_key = key`)
    /// if absent. Later writes to the same column overwrite; writes to other
    /// columns compose.
    pub fn set_field(&mut self, key: &RecordKey, column: &str, value: &str) {
        self.entries
            .entry(key.clone())
            .or_insert_with(|| ModificationEntry::new(key.clone()))
            .set(column, value);
    }

    /// Moves the entry at `key` to the identity derived from its `base_key`
    /// name and the new hierarchy, recording the hierarchy overrides. Creates
    /// the entry first when absent. Returns the new key.
    pub fn reassign(
        &mut self,
        key: &RecordKey,
        category: &str,
        subcategory: &str,
        sub_subcategory: &str,
    ) -> RecordKey {
        let mut entry = self
            .entries
            .remove(key)
            .unwrap_or_else(|| ModificationEntry::new(key.clone()));
        entry.set(crate::record::COL_CATEGORY, category);
        entry.set(crate::record::COL_SUBCATEGORY, subcategory);
        entry.set(crate::record::COL_SUB_SUBCATEGORY, sub_subcategory);
        let new_key = entry
            .base_key
            .with_hierarchy(category, subcategory, sub_subcategory);
        self.entries.insert(new_key.clone(), entry);
        new_key
    }

    pub fn remove(&mut self, key: &RecordKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&ModificationEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.entries.keys()
    }

    /// Applies the journal to a record list. Output order follows input
    /// order; entries whose `base_key` matches no record are skipped.
    #[must_use]
    pub fn apply_to(&self, records: &[Record]) -> Vec<KeyedRecord> {
        // Entry iteration is in current-key order, so when two entries share
        // a base key the one with the greatest current key wins.
        let mut by_base: HashMap<&RecordKey, (&RecordKey, &ModificationEntry)> = HashMap::new();
        for (current_key, entry) in &self.entries {
            by_base.insert(&entry.base_key, (current_key, entry));
        }

        records
            .iter()
            .map(|record| {
                let base_key = record.key();
                match by_base.get(&base_key) {
                    Some((current_key, entry)) => {
                        let mut effective = record.clone();
                        entry.apply_to(&mut effective);
                        KeyedRecord {
                            key: (*current_key).clone(),
                            record: effective,
                        }
                    }
                    None => KeyedRecord {
                        key: base_key,
                        record: record.clone(),
                    },
                }
            })
            .collect()
    }
}
