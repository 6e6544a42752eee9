use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use tracing::debug;
use uuid::Uuid;

use crate::cleaning::{self, CleanReport};
use crate::error::VaultError;
use crate::filter::{self, ColumnFilter};
use crate::hierarchy::{self, HierarchyNode};
use crate::key::RecordKey;
use crate::overlay::ModificationOverlay;
use crate::projection::ColumnLayout;
use crate::record::{KeyedRecord, Record};
use crate::taxonomy::Taxonomy;
use crate::view::{CacheStats, ViewCache};

/// Which of the two independently-edited datasets reads and writes address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatasetSlot {
    #[default]
    Base,
    Draft,
}

impl DatasetSlot {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Draft => "draft",
        }
    }
}

impl FromStr for DatasetSlot {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "draft" => Ok(Self::Draft),
            _ => Err(VaultError::Validation(format!("unknown dataset slot: {s}"))),
        }
    }
}

#[derive(Debug)]
struct Dataset {
    records: Vec<Record>,
    overlay: ModificationOverlay,
    token: Uuid,
}

impl Dataset {
    fn fresh() -> Self {
        Self {
            records: Vec::new(),
            overlay: ModificationOverlay::new(),
            token: Uuid::new_v4(),
        }
    }
}

/// The record store: owns the base and draft datasets with their edit
/// overlays, the taxonomy, the display layout, and the derived-view cache.
/// Single logical writer; every mutating method bumps the version stamp
/// through `touch()` before the next read can observe its effect.
pub struct PartVault {
    base: Dataset,
    draft: Dataset,
    taxonomy: Option<Taxonomy>,
    layout: ColumnLayout,
    active: DatasetSlot,
    version: u64,
    cache: RwLock<ViewCache>,
}

impl std::fmt::Debug for PartVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartVault").finish_non_exhaustive()
    }
}

impl Default for PartVault {
    fn default() -> Self {
        Self::new()
    }
}

impl PartVault {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Dataset::fresh(),
            draft: Dataset::fresh(),
            taxonomy: None,
            layout: ColumnLayout::default(),
            active: DatasetSlot::Base,
            version: 0,
            cache: RwLock::new(ViewCache::default()),
        }
    }

    /// Replaces the base dataset and taxonomy under a fresh dataset token.
    /// The overlay is intentionally left in place; entries that no longer
    /// match a record are skipped at application time.
    pub fn load(&mut self, records: Vec<Record>, taxonomy: Option<Taxonomy>) {
        debug!(records = records.len(), "loading base dataset");
        self.base.records = records;
        self.base.token = Uuid::new_v4();
        self.taxonomy = taxonomy;
        self.touch();
    }

    pub fn load_draft(&mut self, records: Vec<Record>) {
        debug!(records = records.len(), "loading draft dataset");
        self.draft.records = records;
        self.draft.token = Uuid::new_v4();
        self.touch();
    }

    /// Selects the dataset subsequent reads and writes address. Overlay
    /// entries stay with their dataset.
    pub fn switch_active(&mut self, slot: DatasetSlot) {
        self.active = slot;
        self.touch();
    }

    #[must_use]
    pub fn active_slot(&self) -> DatasetSlot {
        self.active
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn dataset_token(&self) -> Uuid {
        self.active_dataset().token
    }

    /// Raw rows of the active dataset, without overlay application.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.active_dataset().records
    }

    #[must_use]
    pub fn taxonomy(&self) -> Option<&Taxonomy> {
        self.taxonomy.as_ref()
    }

    #[must_use]
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn set_visible_columns(&mut self, storage_names: Option<Vec<String>>) {
        self.layout.set_visible(storage_names);
    }

    #[must_use]
    pub fn overlay(&self) -> &ModificationOverlay {
        &self.active_dataset().overlay
    }

    pub fn clear_overlay(&mut self) {
        self.active_dataset_mut().overlay.clear();
        self.touch();
    }

    /// Records one column override for the record currently addressable
    /// under `key`. Unknown keys are a no-op (`false`), keeping retries safe
    /// for UI callers.
    pub fn set_field(&mut self, key: &RecordKey, column: &str, value: &str) -> bool {
        if !self.key_is_known(key) {
            return false;
        }
        self.active_dataset_mut().overlay.set_field(key, column, value);
        self.touch();
        true
    }

    /// Moves the record under `key` to a new hierarchy position. Returns the
    /// key the record is addressable under afterwards; `None` when `key`
    /// matches nothing (no-op).
    pub fn reassign(
        &mut self,
        key: &RecordKey,
        category: &str,
        subcategory: &str,
        sub_subcategory: &str,
    ) -> Option<RecordKey> {
        if !self.key_is_known(key) {
            return None;
        }
        let new_key =
            self.active_dataset_mut()
                .overlay
                .reassign(key, category, subcategory, sub_subcategory);
        self.touch();
        Some(new_key)
    }

    /// Removes the records matching `key`'s decomposed identity from the
    /// active dataset and purges the overlay entry at `key`. No-op (`false`)
    /// when neither exists.
    pub fn delete(&mut self, key: &RecordKey) -> bool {
        let dataset = self.active_dataset_mut();
        let before = dataset.records.len();
        dataset.records.retain(|record| !record.matches_identity(key));
        let removed_rows = before - dataset.records.len();
        let removed_entry = dataset.overlay.remove(key);
        if removed_rows == 0 && !removed_entry {
            return false;
        }
        self.touch();
        true
    }

    /// Looks up the effective record under `key`. A key displaced by a
    /// reassignment still resolves to the unmodified base row.
    #[must_use]
    pub fn record_by_key(&self, key: &RecordKey) -> Option<Record> {
        if let Some(row) = self.effective().into_iter().find(|row| &row.key == key) {
            return Some(row.record);
        }
        self.active_dataset()
            .records
            .iter()
            .find(|record| record.matches_identity(key))
            .cloned()
    }

    /// Active dataset with the overlay applied, memoized per
    /// (dataset token, version stamp).
    #[must_use]
    pub fn effective(&self) -> Vec<KeyedRecord> {
        let dataset = self.active_dataset();
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(rows) = cache.effective(dataset.token, self.version) {
                return rows;
            }
        }
        let rows = dataset.overlay.apply_to(&dataset.records);
        debug!(rows = rows.len(), version = self.version, "recomputed effective rows");
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.store_effective(dataset.token, self.version, &rows);
        rows
    }

    /// `effective()` narrowed by the active filters, memoized per
    /// (dataset token, version stamp, canonical filter signature).
    #[must_use]
    pub fn filtered(&self, filters: &[ColumnFilter]) -> Vec<KeyedRecord> {
        let signature = filter::normalize(filters);
        let token = self.active_dataset().token;
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(rows) = cache.filtered(token, self.version, &signature) {
                return rows;
            }
        }
        let rows = filter::apply_normalized(&self.effective(), &signature);
        debug!(
            rows = rows.len(),
            filters = signature.len(),
            "recomputed filtered rows"
        );
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.store_filtered(token, self.version, signature, &rows);
        rows
    }

    /// Display tree over the filtered rows: taxonomy-driven when a taxonomy
    /// is loaded, inferred from the data otherwise.
    #[must_use]
    pub fn tree(&self, filters: &[ColumnFilter]) -> Vec<HierarchyNode> {
        hierarchy::build_tree(&self.filtered(filters), self.taxonomy.as_ref(), &self.layout)
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .stats()
    }

    /// Applies taxonomy enrichment attributes to the active dataset's rows.
    /// Returns how many rows were touched.
    pub fn enrich(&mut self) -> usize {
        let Some(taxonomy) = self.taxonomy.as_ref() else {
            return 0;
        };
        let dataset = match self.active {
            DatasetSlot::Base => &mut self.base,
            DatasetSlot::Draft => &mut self.draft,
        };
        let touched = taxonomy.enrich(&mut dataset.records);
        self.touch();
        touched
    }

    /// Rewrites multiline cells of the active dataset to single lines.
    pub fn flatten_multiline_cells(&mut self) -> CleanReport {
        let report = cleaning::flatten_multiline(&mut self.active_dataset_mut().records);
        self.touch();
        report
    }

    /// Strips a marker prefix (and following whitespace) from every cell of
    /// the active dataset.
    pub fn strip_prefix_marker(&mut self, marker: &str) -> CleanReport {
        let report = cleaning::strip_prefix_marker(&mut self.active_dataset_mut().records, marker);
        self.touch();
        report
    }

    fn key_is_known(&self, key: &RecordKey) -> bool {
        let dataset = self.active_dataset();
        dataset.overlay.contains(key)
            || dataset
                .records
                .iter()
                .any(|record| record.matches_identity(key))
    }

    fn active_dataset(&self) -> &Dataset {
        match self.active {
            DatasetSlot::Base => &self.base,
            DatasetSlot::Draft => &self.draft,
        }
    }

    fn active_dataset_mut(&mut self) -> &mut Dataset {
        match self.active {
            DatasetSlot::Base => &mut self.base,
            DatasetSlot::Draft => &mut self.draft,
        }
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}
