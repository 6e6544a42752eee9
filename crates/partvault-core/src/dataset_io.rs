use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::Record;
use crate::taxonomy::Taxonomy;

/// Reads a dataset document (a JSON array of row objects). Row cleaning —
/// column-name trimming, duplicate-column dropping, scalar coercion, missing
/// hierarchy columns — happens during deserialization.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    let records: Vec<Record> = serde_json::from_reader(BufReader::new(file))?;
    debug!(records = records.len(), path = %path.display(), "read dataset");
    Ok(records)
}

pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}

/// Reads a taxonomy document. A missing file is not an error; the editor
/// runs without a taxonomy in that case.
pub fn read_taxonomy(path: &Path) -> Result<Taxonomy> {
    if !path.exists() {
        warn!(path = %path.display(), "taxonomy file not found, continuing without one");
        return Ok(Taxonomy::default());
    }
    let file = File::open(path)?;
    let taxonomy = serde_json::from_reader(BufReader::new(file))?;
    Ok(taxonomy)
}
