use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use partvault_core::filter::{ColumnFilter, FilterOp};

#[derive(Debug, Parser)]
#[command(name = "partvault", about = "Inspect and edit PartVault catalog datasets", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the hierarchy tree of a dataset
    Show {
        /// Dataset JSON file
        records: PathBuf,
        /// Taxonomy JSON file driving the tree shape
        #[arg(long)]
        taxonomy: Option<PathBuf>,
        /// View configuration with visible columns and saved filters
        #[arg(long)]
        view: Option<PathBuf>,
        /// Column filter, repeatable
        #[arg(long = "filter", value_name = "COLUMN=OP:VALUE")]
        filters: Vec<String>,
        /// Emit the tree as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the effective dataset to a file
    Export {
        records: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Override one column of the record identified by a key
    Set {
        records: PathBuf,
        /// Record key: name, category, subcategory, and sub-subcategory
        /// joined by the ◆◆◆ delimiter
        key: String,
        column: String,
        value: String,
        /// Where to write the updated dataset (defaults to in place)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Move a record to a new hierarchy position
    Reassign {
        records: PathBuf,
        key: String,
        category: String,
        subcategory: String,
        sub_subcategory: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete the record identified by a key
    Delete {
        records: PathBuf,
        key: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Apply taxonomy enrichment attributes to a dataset
    Enrich {
        records: PathBuf,
        taxonomy: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run cleaning passes over a dataset
    Clean {
        records: PathBuf,
        /// Collapse multiline cells to single lines
        #[arg(long)]
        flatten_multiline: bool,
        /// Strip this marker prefix from every cell
        #[arg(long, value_name = "MARKER")]
        strip_marker: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Suggest hierarchy placements for a part name
    Suggest {
        records: PathBuf,
        /// Full-text part name, e.g. SCREW_M4-20_DIN912
        name: String,
        #[arg(long)]
        taxonomy: Option<PathBuf>,
        #[arg(long, default_value_t = partvault_core::suggest::DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },
}

/// Parses `COLUMN=OP:VALUE`, e.g. `Manufacturer=contains:acme`.
pub fn parse_filter(raw: &str) -> Result<ColumnFilter> {
    let Some((column, rest)) = raw.split_once('=') else {
        bail!("filter {raw:?} is missing '=' between column and predicate");
    };
    let Some((operator, value)) = rest.split_once(':') else {
        bail!("filter {raw:?} is missing ':' between operator and value");
    };
    let operator = FilterOp::from_str(operator)
        .with_context(|| format!("in filter {raw:?}"))?;
    Ok(ColumnFilter::new(column, operator, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_filter_accepts_all_operators() {
        for op in ["contains", "equals", "starts_with", "ends_with"] {
            let filter = parse_filter(&format!("Manufacturer={op}:acme")).expect("parse failed");
            assert_eq!(filter.column, "Manufacturer");
            assert_eq!(filter.value, "acme");
        }
    }

    #[test]
    fn parse_filter_keeps_colons_in_value() {
        let filter = parse_filter("Remark=contains:ratio 2:1").expect("parse failed");
        assert_eq!(filter.value, "ratio 2:1");
    }

    #[test]
    fn parse_filter_rejects_malformed_input() {
        assert!(parse_filter("no-separator").is_err());
        assert!(parse_filter("Manufacturer=containsacme").is_err());
        assert!(parse_filter("Manufacturer=matches:acme").is_err());
    }
}
