use crate::record::{COL_PART_NAME, Record};
use crate::taxonomy::{COL_ORIGIN, COL_SERIALIZED, COL_STAGE, COL_USAGE};

/// One displayable column: the storage name as it appears in the dataset and
/// the label shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub storage: String,
    pub label: String,
}

impl ColumnSpec {
    fn new(storage: &str, label: &str) -> Self {
        Self {
            storage: storage.to_string(),
            label: label.to_string(),
        }
    }
}

/// Display-column configuration: full column list in display order plus an
/// optional visible subset. Hierarchy columns are not listed; the tree
/// levels already carry them.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    columns: Vec<ColumnSpec>,
    visible: Option<Vec<String>>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        let columns = vec![
            ColumnSpec::new(COL_PART_NAME, COL_PART_NAME),
            ColumnSpec::new("CAD Name", "CAD Name"),
            ColumnSpec::new("Manufacturer", "Manufacturer"),
            ColumnSpec::new("SKU", "SKU"),
            ColumnSpec::new("EAN 13", "EAN 13"),
            ColumnSpec::new("Unit", "Unit"),
            ColumnSpec::new("Supplier", "Supplier"),
            ColumnSpec::new("Expiry Date (Y/N)", "Expiry Date"),
            ColumnSpec::new("Tracking Method", "Tracking Method"),
            ColumnSpec::new("Procurement Method (Buy/Make)", "Procurement Method"),
            ColumnSpec::new(COL_STAGE, COL_STAGE),
            ColumnSpec::new(COL_ORIGIN, COL_ORIGIN),
            ColumnSpec::new(COL_SERIALIZED, COL_SERIALIZED),
            ColumnSpec::new(COL_USAGE, COL_USAGE),
            ColumnSpec::new("Remark", "Remark"),
        ];
        Self {
            columns,
            visible: None,
        }
    }
}

impl ColumnLayout {
    #[must_use]
    pub fn specs(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Visible columns in display order. `None` visibility means all.
    #[must_use]
    pub fn visible_specs(&self) -> Vec<&ColumnSpec> {
        match &self.visible {
            None => self.columns.iter().collect(),
            Some(visible) => self
                .columns
                .iter()
                .filter(|spec| visible.iter().any(|name| name == &spec.storage))
                .collect(),
        }
    }

    pub fn set_visible(&mut self, storage_names: Option<Vec<String>>) {
        self.visible = storage_names;
    }

    #[must_use]
    pub fn visible_storage_names(&self) -> Vec<String> {
        self.visible_specs()
            .iter()
            .map(|spec| spec.storage.clone())
            .collect()
    }

    #[must_use]
    pub fn label_for(&self, storage: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|spec| spec.storage == storage)
            .map(|spec| spec.label.as_str())
    }

    /// Projects a record onto the visible columns as (label, value) pairs.
    /// Columns the record does not carry project as empty strings.
    #[must_use]
    pub fn project(&self, record: &Record) -> Vec<(String, String)> {
        self.visible_specs()
            .iter()
            .map(|spec| {
                let value = record
                    .get(&spec.storage)
                    .map(|v| v.into_owned())
                    .unwrap_or_default();
                (spec.label.clone(), value)
            })
            .collect()
    }
}
