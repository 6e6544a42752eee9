use serde::Serialize;

use crate::key::RecordKey;
use crate::projection::ColumnLayout;
use crate::record::KeyedRecord;
use crate::taxonomy::Taxonomy;

/// Presentation-only row striping tag derived from a leaf's position within
/// its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Even } else { Self::Odd }
    }
}

/// Display tree node. Non-leaf variants keep their children in build order;
/// leaves carry the record's current key and the visible-column projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyNode {
    Category {
        name: String,
        children: Vec<HierarchyNode>,
    },
    Subcategory {
        name: String,
        children: Vec<HierarchyNode>,
    },
    SubSubcategory {
        name: String,
        children: Vec<HierarchyNode>,
    },
    Leaf {
        key: RecordKey,
        values: Vec<(String, String)>,
        parity: Parity,
    },
}

impl HierarchyNode {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Category { name, .. }
            | Self::Subcategory { name, .. }
            | Self::SubSubcategory { name, .. } => Some(name),
            Self::Leaf { .. } => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[HierarchyNode] {
        match self {
            Self::Category { children, .. }
            | Self::Subcategory { children, .. }
            | Self::SubSubcategory { children, .. } => children,
            Self::Leaf { .. } => &[],
        }
    }
}

/// Builds the display tree. A supplied taxonomy drives grouping and ordering
/// (empty groups materialize, unmatched records are left out of the tree);
/// without one the shape is inferred from the values actually present, in
/// first-encountered order.
#[must_use]
pub fn build_tree(
    rows: &[KeyedRecord],
    taxonomy: Option<&Taxonomy>,
    layout: &ColumnLayout,
) -> Vec<HierarchyNode> {
    match taxonomy {
        Some(taxonomy) => taxonomy_tree(rows, taxonomy, layout),
        None => inferred_tree(rows, layout),
    }
}

fn leaf_nodes(group: &[&KeyedRecord], layout: &ColumnLayout) -> Vec<HierarchyNode> {
    group
        .iter()
        .enumerate()
        .map(|(index, row)| HierarchyNode::Leaf {
            key: row.key.clone(),
            values: layout.project(&row.record),
            parity: Parity::from_index(index),
        })
        .collect()
}

fn taxonomy_tree(
    rows: &[KeyedRecord],
    taxonomy: &Taxonomy,
    layout: &ColumnLayout,
) -> Vec<HierarchyNode> {
    let mut categories: Vec<HierarchyNode> = Vec::new();

    for category in taxonomy.categories() {
        if category.name.is_empty() {
            continue;
        }
        let mut subcategories = Vec::new();
        for sub in &category.subcategories {
            if sub.name.is_empty() {
                continue;
            }
            let mut leaves = Vec::new();
            for leaf in &sub.sub_subcategories {
                if leaf.name.is_empty() {
                    continue;
                }
                let group: Vec<&KeyedRecord> = rows
                    .iter()
                    .filter(|row| {
                        row.record.hierarchy()
                            == (category.name.as_str(), sub.name.as_str(), leaf.name.as_str())
                    })
                    .collect();
                leaves.push(HierarchyNode::SubSubcategory {
                    name: leaf.name.clone(),
                    children: leaf_nodes(&group, layout),
                });
            }
            subcategories.push(HierarchyNode::Subcategory {
                name: sub.name.clone(),
                children: leaves,
            });
        }
        categories.push(HierarchyNode::Category {
            name: category.name.clone(),
            children: subcategories,
        });
    }

    categories
}

/// Insertion-ordered grouping scaffold used by the inferred mode.
struct Grouped<'a> {
    name: String,
    subs: Vec<(String, Vec<(String, Vec<&'a KeyedRecord>)>)>,
}

fn inferred_tree(rows: &[KeyedRecord], layout: &ColumnLayout) -> Vec<HierarchyNode> {
    let mut groups: Vec<Grouped<'_>> = Vec::new();

    for row in rows {
        let (category, subcategory, sub_subcategory) = row.record.hierarchy();
        let group_index = groups
            .iter()
            .position(|g| g.name == category)
            .unwrap_or_else(|| {
                groups.push(Grouped {
                    name: category.to_string(),
                    subs: Vec::new(),
                });
                groups.len() - 1
            });
        let group = &mut groups[group_index];
        let sub_index = group
            .subs
            .iter()
            .position(|(name, _)| name == subcategory)
            .unwrap_or_else(|| {
                group.subs.push((subcategory.to_string(), Vec::new()));
                group.subs.len() - 1
            });
        let sub = &mut group.subs[sub_index];
        let leaf_index = sub
            .1
            .iter()
            .position(|(name, _)| name == sub_subcategory)
            .unwrap_or_else(|| {
                sub.1.push((sub_subcategory.to_string(), Vec::new()));
                sub.1.len() - 1
            });
        sub.1[leaf_index].1.push(row);
    }

    groups
        .into_iter()
        .map(|group| HierarchyNode::Category {
            name: group.name,
            children: group
                .subs
                .into_iter()
                .map(|(sub_name, leaf_groups)| HierarchyNode::Subcategory {
                    name: sub_name,
                    children: leaf_groups
                        .into_iter()
                        .map(|(leaf_name, records)| HierarchyNode::SubSubcategory {
                            name: leaf_name,
                            children: leaf_nodes(&records, layout),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
