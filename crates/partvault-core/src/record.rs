use std::borrow::Cow;
use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::key::RecordKey;
use crate::name::PartName;

pub const COL_PART_NAME: &str = "Part Name";
pub const COL_CATEGORY: &str = "Category";
pub const COL_SUBCATEGORY: &str = "Subcategory";
pub const COL_SUB_SUBCATEGORY: &str = "Sub-subcategory";

pub const HIERARCHY_COLUMNS: [&str; 3] = [COL_CATEGORY, COL_SUBCATEGORY, COL_SUB_SUBCATEGORY];

/// One catalog row: the structured primary name plus ordered scalar columns.
/// The three hierarchy columns are always present (empty when unassigned).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    name: PartName,
    fields: Vec<(String, String)>,
}

impl Record {
    #[must_use]
    pub fn new(name: PartName) -> Self {
        let mut record = Self {
            name,
            fields: Vec::new(),
        };
        record.ensure_hierarchy_columns();
        record
    }

    #[must_use]
    pub fn from_parts(name: PartName, fields: Vec<(String, String)>) -> Self {
        let mut record = Self { name, fields };
        record.ensure_hierarchy_columns();
        record
    }

    fn ensure_hierarchy_columns(&mut self) {
        for column in HIERARCHY_COLUMNS {
            if !self.fields.iter().any(|(c, _)| c == column) {
                self.fields.push((column.to_string(), String::new()));
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &PartName {
        &self.name
    }

    pub fn set_name(&mut self, name: PartName) {
        self.name = name;
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        self.name.full_text()
    }

    /// Value of a column in string form. The primary-name column yields the
    /// derived full text; absent columns yield `None`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<Cow<'_, str>> {
        if column == COL_PART_NAME {
            return Some(Cow::Owned(self.name.full_text()));
        }
        self.scalar(column).map(Cow::Borrowed)
    }

    #[must_use]
    pub fn scalar(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a column. Writing the primary-name column re-parses the text into
    /// the structured name; other columns update in place or append.
    pub fn set(&mut self, column: &str, value: &str) {
        if column == COL_PART_NAME {
            self.name = PartName::parse(value);
            return;
        }
        if let Some(slot) = self.fields.iter_mut().find(|(c, _)| c == column) {
            slot.1 = value.to_string();
        } else {
            self.fields.push((column.to_string(), value.to_string()));
        }
    }

    #[must_use]
    pub fn hierarchy(&self) -> (&str, &str, &str) {
        (
            self.scalar(COL_CATEGORY).unwrap_or_default(),
            self.scalar(COL_SUBCATEGORY).unwrap_or_default(),
            self.scalar(COL_SUB_SUBCATEGORY).unwrap_or_default(),
        )
    }

    pub fn set_hierarchy(&mut self, category: &str, subcategory: &str, sub_subcategory: &str) {
        self.set(COL_CATEGORY, category);
        self.set(COL_SUBCATEGORY, subcategory);
        self.set(COL_SUB_SUBCATEGORY, sub_subcategory);
    }

    /// Derived working identity of this record as currently stored.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        let (category, subcategory, sub_subcategory) = self.hierarchy();
        RecordKey::new(self.name.full_text(), category, subcategory, sub_subcategory)
    }

    #[must_use]
    pub fn matches_identity(&self, key: &RecordKey) -> bool {
        self.name.full_text() == key.name() && self.hierarchy() == key.hierarchy()
    }

    /// Scalar columns in stored order, excluding the primary-name column.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub(crate) fn scalar_cells_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.fields.iter_mut().map(|(_, v)| v)
    }

    fn from_document(map: serde_json::Map<String, Value>) -> Self {
        let mut name = PartName::default();
        let mut fields = Vec::with_capacity(map.len());
        // First occurrence wins for columns that collide after trimming.
        let mut seen = HashSet::new();

        for (raw_column, value) in map {
            let column = raw_column.trim().to_string();
            if !seen.insert(column.clone()) {
                continue;
            }
            if column == COL_PART_NAME {
                name = parse_name_value(value);
            } else {
                fields.push((column, coerce_scalar(value)));
            }
        }

        Self::from_parts(name, fields)
    }
}

/// A record paired with the key it is currently addressable under. For
/// overlaid records this is the overlay entry's current key, which differs
/// from the record's own derived key after a reassignment.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRecord {
    pub key: RecordKey,
    pub record: Record,
}

fn parse_name_value(value: Value) -> PartName {
    match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        other => PartName::parse(&coerce_scalar(other)),
    }
}

fn coerce_scalar(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(COL_PART_NAME, &self.name)?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let map = serde_json::Map::deserialize(deserializer)?;
        Ok(Self::from_document(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::new(PartName::new("SCREW", "M4-20", "DIN912"));
        record.set_hierarchy("Hardware", "Fasteners", "Screws");
        record.set("Manufacturer", "Acme");
        record
    }

    #[test]
    fn key_combines_name_and_hierarchy() {
        let key = sample().key();
        assert_eq!(key.name(), "SCREW_M4-20_DIN912");
        assert_eq!(key.hierarchy(), ("Hardware", "Fasteners", "Screws"));
    }

    #[test]
    fn setting_name_column_reparses_structure() {
        let mut record = sample();
        record.set(COL_PART_NAME, "NUT_M4_A2");
        assert_eq!(record.name().type_code, "NUT");
        assert_eq!(record.name().part_number, "M4");
        assert_eq!(record.name().detail, "A2");
    }

    #[test]
    fn missing_hierarchy_columns_are_materialized() {
        let record: Record =
            serde_json::from_str(r#"{"Part Name": "BOLT_B-1", "Manufacturer": "Acme"}"#)
                .expect("deserialize failed");
        assert_eq!(record.hierarchy(), ("", "", ""));
        assert_eq!(record.scalar("Manufacturer"), Some("Acme"));
    }

    #[test]
    fn structured_name_object_is_accepted() {
        let record: Record = serde_json::from_str(
            r#"{"Part Name": {"type": "BOLT", "part_number": "B-1", "detail": "steel"},
                "Category": "Hardware"}"#,
        )
        .expect("deserialize failed");
        assert_eq!(record.full_name(), "BOLT_B-1_steel");
    }

    #[test]
    fn duplicate_columns_keep_first_occurrence() {
        let record: Record = serde_json::from_str(
            r#"{"Part Name": "BOLT", "Unit": "pcs", "Unit ": "boxes"}"#,
        )
        .expect("deserialize failed");
        assert_eq!(record.scalar("Unit"), Some("pcs"));
    }

    #[test]
    fn non_string_scalars_are_coerced() {
        let record: Record = serde_json::from_str(
            r#"{"Part Name": "BOLT", "Stock": 42, "Active": true, "Remark": null}"#,
        )
        .expect("deserialize failed");
        assert_eq!(record.scalar("Stock"), Some("42"));
        assert_eq!(record.scalar("Active"), Some("true"));
        assert_eq!(record.scalar("Remark"), Some(""));
    }

    #[test]
    fn serialization_keeps_column_order() {
        let json = serde_json::to_string(&sample()).expect("serialize failed");
        let name_pos = json.find("Part Name").expect("missing name column");
        let category_pos = json.find("Category").expect("missing category");
        let manufacturer_pos = json.find("Manufacturer").expect("missing manufacturer");
        assert!(name_pos < category_pos && category_pos < manufacturer_pos);
    }

    #[test]
    fn get_exposes_derived_full_name() {
        let record = sample();
        assert_eq!(record.get(COL_PART_NAME).as_deref(), Some("SCREW_M4-20_DIN912"));
        assert_eq!(record.get("Manufacturer").as_deref(), Some("Acme"));
        assert_eq!(record.get("No Such Column"), None);
    }
}
