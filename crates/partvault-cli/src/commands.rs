use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use partvault_core::config::ViewConfig;
use partvault_core::dataset_io::{read_records, read_taxonomy, write_records};
use partvault_core::filter::ColumnFilter;
use partvault_core::hierarchy::HierarchyNode;
use partvault_core::name::PartName;
use partvault_core::suggest::{self, SuggestionSource};
use partvault_core::{PartVault, Record, RecordKey};

use crate::cli::{Command, parse_filter};

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Show {
            records,
            taxonomy,
            view,
            filters,
            json,
        } => show(&records, taxonomy.as_deref(), view.as_deref(), &filters, json),
        Command::Export { records, output } => export(&records, &output),
        Command::Set {
            records,
            key,
            column,
            value,
            output,
        } => set(&records, &key, &column, &value, output),
        Command::Reassign {
            records,
            key,
            category,
            subcategory,
            sub_subcategory,
            output,
        } => reassign(&records, &key, &category, &subcategory, &sub_subcategory, output),
        Command::Delete {
            records,
            key,
            output,
        } => delete(&records, &key, output),
        Command::Enrich {
            records,
            taxonomy,
            output,
        } => enrich(&records, &taxonomy, output),
        Command::Clean {
            records,
            flatten_multiline,
            strip_marker,
            output,
        } => clean(&records, flatten_multiline, strip_marker.as_deref(), output),
        Command::Suggest {
            records,
            name,
            taxonomy,
            limit,
        } => suggest_placements(&records, &name, taxonomy.as_deref(), limit),
    }
}

fn load_vault(records: &Path, taxonomy: Option<&Path>) -> Result<PartVault> {
    let rows = read_records(records)
        .with_context(|| format!("reading dataset {}", records.display()))?;
    let taxonomy = match taxonomy {
        Some(path) => {
            let taxonomy = read_taxonomy(path)
                .with_context(|| format!("reading taxonomy {}", path.display()))?;
            (!taxonomy.is_empty()).then_some(taxonomy)
        }
        None => None,
    };
    let mut vault = PartVault::new();
    vault.load(rows, taxonomy);
    Ok(vault)
}

fn parse_key(raw: &str) -> Result<RecordKey> {
    RecordKey::parse(raw).with_context(|| format!("parsing record key {raw:?}"))
}

fn effective_records(vault: &PartVault) -> Vec<Record> {
    vault.effective().into_iter().map(|row| row.record).collect()
}

fn write_back(records: &Path, output: Option<PathBuf>, rows: &[Record]) -> Result<()> {
    let target = output.unwrap_or_else(|| records.to_path_buf());
    write_records(&target, rows)
        .with_context(|| format!("writing dataset {}", target.display()))?;
    println!("wrote {} records to {}", rows.len(), target.display());
    Ok(())
}

fn show(
    records: &Path,
    taxonomy: Option<&Path>,
    view: Option<&Path>,
    raw_filters: &[String],
    json: bool,
) -> Result<()> {
    let mut vault = load_vault(records, taxonomy)?;

    let mut filters: Vec<ColumnFilter> = Vec::new();
    if let Some(view_path) = view {
        let config = ViewConfig::load(view_path)
            .with_context(|| format!("reading view config {}", view_path.display()))?;
        vault.set_visible_columns(config.visible_columns);
        filters.extend(config.filters);
    }
    for raw in raw_filters {
        filters.push(parse_filter(raw)?);
    }

    let tree = vault.tree(&filters);
    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_nodes(&tree, 0);
    }
    Ok(())
}

fn print_nodes(nodes: &[HierarchyNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            HierarchyNode::Leaf { values, .. } => {
                let row = values
                    .iter()
                    .map(|(_, value)| value.as_str())
                    .collect::<Vec<_>>()
                    .join(" | ");
                println!("{indent}- {row}");
            }
            _ => {
                println!("{indent}{}", node.name().unwrap_or_default());
                print_nodes(node.children(), depth + 1);
            }
        }
    }
}

fn export(records: &Path, output: &Path) -> Result<()> {
    let vault = load_vault(records, None)?;
    let rows = effective_records(&vault);
    write_back(records, Some(output.to_path_buf()), &rows)
}

fn set(
    records: &Path,
    key: &str,
    column: &str,
    value: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut vault = load_vault(records, None)?;
    let key = parse_key(key)?;
    if !vault.set_field(&key, column, value) {
        bail!("no record matches key {key}");
    }
    write_back(records, output, &effective_records(&vault))
}

fn reassign(
    records: &Path,
    key: &str,
    category: &str,
    subcategory: &str,
    sub_subcategory: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut vault = load_vault(records, None)?;
    let key = parse_key(key)?;
    let Some(new_key) = vault.reassign(&key, category, subcategory, sub_subcategory) else {
        bail!("no record matches key {key}");
    };
    println!("record now addressable as {new_key}");
    write_back(records, output, &effective_records(&vault))
}

fn delete(records: &Path, key: &str, output: Option<PathBuf>) -> Result<()> {
    let mut vault = load_vault(records, None)?;
    let key = parse_key(key)?;
    if !vault.delete(&key) {
        bail!("no record matches key {key}");
    }
    write_back(records, output, &effective_records(&vault))
}

fn enrich(records: &Path, taxonomy: &Path, output: Option<PathBuf>) -> Result<()> {
    let mut vault = load_vault(records, Some(taxonomy))?;
    let touched = vault.enrich();
    println!("enriched {touched} records");
    write_back(records, output, &effective_records(&vault))
}

fn clean(
    records: &Path,
    flatten_multiline: bool,
    strip_marker: Option<&str>,
    output: Option<PathBuf>,
) -> Result<()> {
    if !flatten_multiline && strip_marker.is_none() {
        bail!("nothing to do: pass --flatten-multiline and/or --strip-marker");
    }
    let mut vault = load_vault(records, None)?;
    if flatten_multiline {
        let report = vault.flatten_multiline_cells();
        println!(
            "flattened {} of {} cells ({:.1}%)",
            report.changed,
            report.cells,
            report.ratio() * 100.0
        );
    }
    if let Some(marker) = strip_marker {
        let report = vault.strip_prefix_marker(marker);
        println!(
            "stripped {marker:?} from {} of {} cells ({:.1}%)",
            report.changed,
            report.cells,
            report.ratio() * 100.0
        );
    }
    write_back(records, output, &effective_records(&vault))
}

fn suggest_placements(
    records: &Path,
    name: &str,
    taxonomy: Option<&Path>,
    limit: usize,
) -> Result<()> {
    let vault = load_vault(records, taxonomy)?;
    let suggestions = suggest::suggest(
        vault.records(),
        vault.taxonomy(),
        &PartName::parse(name),
        limit,
    );
    if suggestions.is_empty() {
        println!("no placement suggestions for {name:?}");
        return Ok(());
    }
    for suggestion in suggestions {
        let source = match suggestion.source {
            SuggestionSource::Pattern => "pattern",
            SuggestionSource::Similarity => "similarity",
        };
        println!(
            "{} > {} > {}  ({:.2}, {source})",
            suggestion.category,
            suggestion.subcategory,
            suggestion.sub_subcategory,
            suggestion.score
        );
    }
    Ok(())
}
