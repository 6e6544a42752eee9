use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::record::{KeyedRecord, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
}

impl FilterOp {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
        }
    }
}

impl FromStr for FilterOp {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains" => Ok(Self::Contains),
            "equals" => Ok(Self::Equals),
            "starts_with" => Ok(Self::StartsWith),
            "ends_with" => Ok(Self::EndsWith),
            _ => Err(VaultError::Validation(format!("unknown filter operator: {s}"))),
        }
    }
}

/// One column predicate. An empty (or whitespace-only) value means the
/// filter is inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: String,
    pub operator: FilterOp,
    pub value: String,
}

impl ColumnFilter {
    #[must_use]
    pub fn new(column: impl Into<String>, operator: FilterOp, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// Active filter in canonical form: trimmed column, lowercased value. The
/// sorted list doubles as the cache signature, so map iteration order in the
/// caller can never cause a spurious cache miss.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct NormalizedFilter {
    column: String,
    operator: FilterOp,
    value: String,
}

pub(crate) fn normalize(filters: &[ColumnFilter]) -> Vec<NormalizedFilter> {
    let mut normalized: Vec<NormalizedFilter> = filters
        .iter()
        .filter(|f| f.is_active())
        .map(|f| NormalizedFilter {
            column: f.column.trim().to_string(),
            operator: f.operator,
            value: f.value.trim().to_lowercase(),
        })
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// All operators compare case-insensitively. A filter on a column the record
/// does not carry is no constraint for that record.
fn matches(record: &Record, filter: &NormalizedFilter) -> bool {
    let Some(value) = record.get(&filter.column) else {
        return true;
    };
    let haystack = value.to_lowercase();
    match filter.operator {
        FilterOp::Contains => haystack.contains(&filter.value),
        FilterOp::Equals => haystack == filter.value,
        FilterOp::StartsWith => haystack.starts_with(&filter.value),
        FilterOp::EndsWith => haystack.ends_with(&filter.value),
    }
}

pub(crate) fn record_passes(record: &Record, filters: &[NormalizedFilter]) -> bool {
    filters.iter().all(|filter| matches(record, filter))
}

/// Conjunction of the active filters over an effective row list.
#[must_use]
pub fn apply(rows: &[KeyedRecord], filters: &[ColumnFilter]) -> Vec<KeyedRecord> {
    apply_normalized(rows, &normalize(filters))
}

pub(crate) fn apply_normalized(
    rows: &[KeyedRecord],
    filters: &[NormalizedFilter],
) -> Vec<KeyedRecord> {
    rows.iter()
        .filter(|row| record_passes(&row.record, filters))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::PartName;

    fn record(full_name: &str, manufacturer: &str) -> Record {
        let mut record = Record::new(PartName::parse(full_name));
        record.set_hierarchy("Hardware", "Fasteners", "Screws");
        record.set("Manufacturer", manufacturer);
        record
    }

    fn passes(record: &Record, filter: ColumnFilter) -> bool {
        record_passes(record, &normalize(&[filter]))
    }

    #[test]
    fn contains_is_case_insensitive() {
        let r = record("Bolt_B-1", "Acme");
        assert!(passes(&r, ColumnFilter::new("Part Name", FilterOp::Contains, "bo")));
        assert!(passes(&r, ColumnFilter::new("Part Name", FilterOp::Contains, "BO")));
        assert!(!passes(&r, ColumnFilter::new("Part Name", FilterOp::Contains, "xyz")));
    }

    #[test]
    fn prefix_and_suffix_are_case_insensitive() {
        let r = record("Bolt_B-1", "Acme");
        assert!(passes(&r, ColumnFilter::new("Part Name", FilterOp::StartsWith, "bolt")));
        assert!(passes(&r, ColumnFilter::new("Part Name", FilterOp::EndsWith, "b-1")));
        assert!(!passes(&r, ColumnFilter::new("Part Name", FilterOp::StartsWith, "b-1")));
    }

    #[test]
    fn equals_matches_whole_value() {
        let r = record("Bolt", "Acme");
        assert!(passes(&r, ColumnFilter::new("Manufacturer", FilterOp::Equals, "acme")));
        assert!(!passes(&r, ColumnFilter::new("Manufacturer", FilterOp::Equals, "acm")));
    }

    #[test]
    fn missing_column_is_no_constraint() {
        let r = record("Bolt", "Acme");
        assert!(passes(&r, ColumnFilter::new("Supplier", FilterOp::Contains, "anything")));
    }

    #[test]
    fn empty_value_is_inactive() {
        assert!(normalize(&[ColumnFilter::new("Manufacturer", FilterOp::Contains, "  ")]).is_empty());
    }

    #[test]
    fn filters_combine_with_and() {
        let r = record("Bolt", "Acme");
        let both = normalize(&[
            ColumnFilter::new("Part Name", FilterOp::Contains, "bo"),
            ColumnFilter::new("Manufacturer", FilterOp::Equals, "acme"),
        ]);
        assert!(record_passes(&r, &both));

        let conflicting = normalize(&[
            ColumnFilter::new("Part Name", FilterOp::Contains, "bo"),
            ColumnFilter::new("Manufacturer", FilterOp::Equals, "umbrella"),
        ]);
        assert!(!record_passes(&r, &conflicting));
    }

    #[test]
    fn normalization_is_order_independent() {
        let a = ColumnFilter::new("Part Name", FilterOp::Contains, "Bo");
        let b = ColumnFilter::new("Manufacturer", FilterOp::Equals, "ACME");
        assert_eq!(normalize(&[a.clone(), b.clone()]), normalize(&[b, a]));
    }
}
