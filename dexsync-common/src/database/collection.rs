use crate::structs::{into_collection, record_id, Collection, Record};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

///
/// Load an optional collection.
///
/// A missing file is an empty history. A file that is not valid JSON, or
/// not an array of records with string ids, is logged and also treated as
/// empty so one bad file does not stop the run (the next save replaces it).
///
pub fn load_collection(path: &Path) -> Collection {
    if !path.exists() {
        info!("{} not found, starting from an empty collection", path.display());
        return Vec::new();
    }
    match read_collection(path) {
        Ok(records) => {
            debug!("Loaded {} records from {}", records.len(), path.display());
            records
        }
        Err(why) => {
            warn!(
                "{} is unreadable ({}), treating it as an empty collection",
                path.display(),
                why
            );
            Vec::new()
        }
    }
}

/// Load a collection the current task cannot run without.
pub fn load_required(path: &Path) -> Result<Collection> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let records = read_collection(path)?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Same policy as [`load_collection`], keyed by id for lookups.
pub fn load_index(path: &Path) -> IndexMap<String, Record> {
    load_collection(path)
        .into_iter()
        .filter_map(|record| {
            let id = record_id(&record)?.to_string();
            Some((id, record))
        })
        .collect()
}

fn read_collection(path: &Path) -> Result<Collection> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    into_collection(value).map_err(|reason| Error::InvalidShape {
        path: path.to_path_buf(),
        reason,
    })
}

/// Plain byte-wise ordering of ids: "me10" comes before "me2".
pub fn sort_by_id(records: &mut Collection) {
    records.sort_by(|a, b| record_id(a).cmp(&record_id(b)));
}

///
/// Sort `records` by id and overwrite `path` with them.
///
/// Output is a two-space indented array with non-ASCII characters written
/// as-is. The file is written in place: the whole document is rendered
/// first, but a crash during the write itself can still leave it truncated.
///
pub fn save_collection(path: &Path, mut records: Collection) -> Result<usize> {
    sort_by_id(&mut records);
    let rendered = serde_json::to_vec_pretty(&records)?;
    fs::write(path, rendered)?;
    info!("Saved {} records to {}", records.len(), path.display());
    Ok(records.len())
}
