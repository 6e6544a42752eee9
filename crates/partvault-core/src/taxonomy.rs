use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::record::Record;

pub const COL_STAGE: &str = "Stage";
pub const COL_ORIGIN: &str = "Origin";
pub const COL_SERIALIZED: &str = "Serialized";
pub const COL_USAGE: &str = "Usage";

/// Externally supplied three-level category definition. Nodes without a name
/// are skipped wherever the taxonomy is walked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    categories: Vec<TaxonomyCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyCategory {
    #[serde(rename = "category", default)]
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<TaxonomySubcategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomySubcategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sub_subcategories: Vec<TaxonomyLeaf>,
}

/// Leaf node: a sub-subcategory plus the enrichment attributes every part
/// assigned to it inherits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyLeaf {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub serialized: String,
    #[serde(default)]
    pub usage: String,
}

impl TaxonomyLeaf {
    fn enrichment(&self) -> [(&'static str, &str); 4] {
        [
            (COL_STAGE, self.stage.as_str()),
            (COL_ORIGIN, self.origin.as_str()),
            (COL_SERIALIZED, self.serialized.as_str()),
            (COL_USAGE, self.usage.as_str()),
        ]
    }
}

impl Taxonomy {
    #[must_use]
    pub fn new(categories: Vec<TaxonomyCategory>) -> Self {
        Self { categories }
    }

    #[must_use]
    pub fn categories(&self) -> &[TaxonomyCategory] {
        &self.categories
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Walks named leaves in taxonomy order, skipping any node missing a name.
    pub fn walk(&self) -> impl Iterator<Item = (&TaxonomyCategory, &TaxonomySubcategory, &TaxonomyLeaf)> {
        self.categories
            .iter()
            .filter(|category| {
                if category.name.is_empty() {
                    warn!("skipping taxonomy category without a name");
                    return false;
                }
                true
            })
            .flat_map(|category| {
                category
                    .subcategories
                    .iter()
                    .filter(|sub| !sub.name.is_empty())
                    .flat_map(move |sub| {
                        sub.sub_subcategories
                            .iter()
                            .filter(|leaf| !leaf.name.is_empty())
                            .map(move |leaf| (category, sub, leaf))
                    })
            })
    }

    #[must_use]
    pub fn leaf_paths(&self) -> Vec<(&str, &str, &str)> {
        self.walk()
            .map(|(category, sub, leaf)| {
                (category.name.as_str(), sub.name.as_str(), leaf.name.as_str())
            })
            .collect()
    }

    #[must_use]
    pub fn contains_path(&self, category: &str, subcategory: &str, sub_subcategory: &str) -> bool {
        self.walk().any(|(c, s, leaf)| {
            c.name == category && s.name == subcategory && leaf.name == sub_subcategory
        })
    }

    /// Copies each leaf's non-empty enrichment attributes onto every record
    /// whose hierarchy triple matches exactly. Returns how many records were
    /// touched. Empty attributes never overwrite existing values.
    pub fn enrich(&self, records: &mut [Record]) -> usize {
        let leaves: HashMap<(&str, &str, &str), &TaxonomyLeaf> = self
            .walk()
            .map(|(category, sub, leaf)| {
                (
                    (category.name.as_str(), sub.name.as_str(), leaf.name.as_str()),
                    leaf,
                )
            })
            .collect();

        let mut touched = 0;
        for record in records {
            let Some(leaf) = leaves.get(&record.hierarchy()) else {
                continue;
            };
            let updates: Vec<(&str, String)> = leaf
                .enrichment()
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(column, value)| (column, value.to_string()))
                .collect();
            if updates.is_empty() {
                continue;
            }
            for (column, value) in updates {
                record.set(column, &value);
            }
            touched += 1;
        }
        touched
    }
}
