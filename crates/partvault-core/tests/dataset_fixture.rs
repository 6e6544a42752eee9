use std::path::PathBuf;

use partvault_core::dataset_io::{read_records, read_taxonomy, write_records};
use partvault_core::filter::{ColumnFilter, FilterOp};
use partvault_core::hierarchy::HierarchyNode;
use partvault_core::record::COL_PART_NAME;
use partvault_core::taxonomy::COL_STAGE;
use partvault_core::PartVault;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn loaded_vault() -> PartVault {
    let records = read_records(&fixture_path("catalog.json")).expect("read catalog fixture");
    let taxonomy = read_taxonomy(&fixture_path("taxonomy.json")).expect("read taxonomy fixture");
    let mut vault = PartVault::new();
    vault.load(records, Some(taxonomy));
    vault
}

#[test]
fn fixture_rows_are_cleaned_on_load() {
    let vault = loaded_vault();
    assert_eq!(vault.records().len(), 4);

    // Scalar name strings parse into the structured form.
    let plug = &vault.records()[2];
    assert_eq!(plug.name().type_code, "PLUG");
    assert_eq!(plug.name().part_number, "P-7");
    assert_eq!(plug.full_name(), "PLUG_P-7_IP67");

    // Numeric and null cells coerce to strings.
    assert_eq!(plug.scalar("SKU"), Some("70031"));
    assert_eq!(vault.records()[3].scalar("Remark"), Some(""));
}

#[test]
fn enrichment_applies_taxonomy_attributes() {
    let mut vault = loaded_vault();
    let touched = vault.enrich();
    // The two screws and the plug sit on enriched taxonomy leaves; the glue
    // has no taxonomy counterpart.
    assert_eq!(touched, 3);
    assert_eq!(vault.records()[0].scalar(COL_STAGE), Some("Series"));
    assert_eq!(vault.records()[2].scalar(COL_STAGE), Some("Prototype"));
    assert_eq!(vault.records()[3].scalar(COL_STAGE), None);
}

#[test]
fn taxonomy_tree_shows_empty_bolts_group_and_drops_glue() {
    let vault = loaded_vault();
    let tree = vault.tree(&[]);

    // Taxonomy order, taxonomy membership: Hardware then Electrical, no
    // Chemicals category for the unmatched glue record.
    let names: Vec<_> = tree.iter().filter_map(HierarchyNode::name).collect();
    assert_eq!(names, vec!["Hardware", "Electrical"]);

    let fasteners = &tree[0].children()[0];
    let leaf_names: Vec<_> = fasteners
        .children()
        .iter()
        .filter_map(HierarchyNode::name)
        .collect();
    assert_eq!(leaf_names, vec!["Screws", "Bolts"]);
    let bolts = &fasteners.children()[1];
    assert!(bolts.children().is_empty());
}

#[test]
fn projection_respects_visible_columns() {
    let mut vault = loaded_vault();
    vault.set_visible_columns(Some(vec![
        COL_PART_NAME.to_string(),
        "Manufacturer".to_string(),
    ]));

    let tree = vault.tree(&[ColumnFilter::new(COL_PART_NAME, FilterOp::Contains, "plug")]);
    let electrical = tree
        .iter()
        .find(|node| node.name() == Some("Electrical"))
        .expect("missing category");
    let leaf = &electrical.children()[0].children()[0].children()[0];
    let HierarchyNode::Leaf { values, .. } = leaf else {
        panic!("expected leaf");
    };
    assert_eq!(
        values,
        &vec![
            ("Part Name".to_string(), "PLUG_P-7_IP67".to_string()),
            ("Manufacturer".to_string(), "Volta".to_string()),
        ]
    );
}

#[test]
fn effective_rows_survive_a_file_round_trip() {
    let mut vault = loaded_vault();
    let key = vault.records()[0].key();
    vault.set_field(&key, "Manufacturer", "Umbrella");

    let rows: Vec<_> = vault
        .effective()
        .into_iter()
        .map(|row| row.record)
        .collect();

    let dir = tempfile::tempdir().expect("tempdir failed");
    let path = dir.path().join("export.json");
    write_records(&path, &rows).expect("write failed");
    let reloaded = read_records(&path).expect("reload failed");

    assert_eq!(reloaded, rows);
    assert_eq!(reloaded[0].scalar("Manufacturer"), Some("Umbrella"));
}
