use crate::structs::{id_index, project, record_id, Collection, Record};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Fields kept for cards added to the lightweight list.
pub const LIST_PROJECTION: [&str; 2] = ["id", "name"];

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub collection: Collection,
    pub added: Collection,
}

///
/// Append to `existing` the records of `fetched` whose id it does not know yet.
///
/// Added records are reduced to `projection`. Nothing is removed or
/// rewritten, and an id appearing several times in `fetched` is added once.
///
pub fn merge_new(existing: Collection, fetched: &[Record], projection: &[&str]) -> MergeOutcome {
    let mut known = id_index(&existing);
    let mut added = Vec::new();
    for record in fetched {
        let id = match record_id(record) {
            Some(id) => id,
            None => {
                warn!("Skipping fetched record without id: {:?}", record);
                continue;
            }
        };
        if known.insert(id.to_string()) {
            added.push(project(record, projection));
        }
    }
    debug!("{} new records out of {} fetched", added.len(), fetched.len());
    let mut collection = existing;
    collection.extend(added.iter().cloned());
    MergeOutcome { collection, added }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Series,
    Sets,
}

#[derive(Debug, Default)]
pub struct CatalogOutcome {
    pub collection: Collection,
    pub added: usize,
    pub updated: usize,
}

///
/// Bring a series or sets catalog up to date with the API list.
///
/// Unknown ids are added in the catalog shape. Known entries get their
/// `name` (and for sets `totalCards`) refreshed when the API disagrees.
/// Entries missing from the API are left alone.
///
pub fn merge_catalog(existing: Collection, fetched: &[Record], kind: CatalogKind) -> CatalogOutcome {
    let mut outcome = CatalogOutcome {
        collection: existing,
        ..CatalogOutcome::default()
    };
    for remote in fetched {
        let id = match record_id(remote) {
            Some(id) => id,
            None => continue,
        };
        let position = outcome
            .collection
            .iter()
            .position(|entry| record_id(entry) == Some(id));
        match position {
            Some(index) => {
                if refresh_entry(&mut outcome.collection[index], remote, kind) {
                    debug!("Updated {:?} entry {}", kind, id);
                    outcome.updated += 1;
                }
            }
            None => {
                debug!("New {:?} entry {}", kind, id);
                outcome.collection.push(catalog_entry(remote, kind));
                outcome.added += 1;
            }
        }
    }
    outcome
}

fn catalog_entry(remote: &Record, kind: CatalogKind) -> Record {
    let mut entry = project(remote, &["id", "name"]);
    match kind {
        CatalogKind::Series => {
            entry.insert("logo".to_string(), string_or_empty(remote, "logo"));
        }
        CatalogKind::Sets => {
            let id = record_id(remote).unwrap_or_default();
            let series = remote_series(remote).unwrap_or_else(|| infer_series(id).to_string());
            entry.insert("series".to_string(), Value::String(series));
            if let Some(date) = remote.get("releaseDate") {
                entry.insert("releaseDate".to_string(), date.clone());
            }
            entry.insert(
                "totalCards".to_string(),
                json!(card_count(remote).unwrap_or(0)),
            );
            entry.insert("symbol".to_string(), string_or_empty(remote, "symbol"));
            entry.insert("logo".to_string(), string_or_empty(remote, "logo"));
        }
    }
    entry
}

fn refresh_entry(entry: &mut Record, remote: &Record, kind: CatalogKind) -> bool {
    let mut changed = false;
    if let Some(name) = remote.get("name") {
        if entry.get("name") != Some(name) {
            entry.insert("name".to_string(), name.clone());
            if kind == CatalogKind::Series {
                entry.insert("logo".to_string(), string_or_empty(remote, "logo"));
            }
            changed = true;
        }
    }
    if kind == CatalogKind::Sets {
        if let Some(total) = card_count(remote) {
            let total = json!(total);
            if entry.get("totalCards") != Some(&total) {
                entry.insert("totalCards".to_string(), total);
                changed = true;
            }
        }
    }
    changed
}

fn string_or_empty(record: &Record, field: &str) -> Value {
    match record.get(field) {
        Some(Value::String(value)) => Value::String(value.clone()),
        _ => Value::String(String::new()),
    }
}

// `serie` is what the API sends, as a string or an object with an id.
fn remote_series(remote: &Record) -> Option<String> {
    let value = remote.get("serie").or_else(|| remote.get("series"))?;
    match value {
        Value::String(code) if !code.is_empty() => Some(code.clone()),
        Value::Object(nested) => record_id(nested).map(str::to_string),
        _ => None,
    }
}

// `cardCount.total`, falling back to `cardCount.official`. Zero counts as missing.
fn card_count(remote: &Record) -> Option<u64> {
    let counts = remote.get("cardCount")?.as_object()?;
    let total = counts.get("total").and_then(Value::as_u64).filter(|n| *n > 0);
    total.or_else(|| counts.get("official").and_then(Value::as_u64))
}

const SERIES_PREFIXES: [&str; 6] = ["base", "bw", "xy", "sm", "swsh", "sv"];

/// Best guess of the series a set belongs to, from its id.
pub fn infer_series(set_id: &str) -> &'static str {
    SERIES_PREFIXES
        .iter()
        .find(|prefix| set_id.starts_with(*prefix))
        .copied()
        .unwrap_or("unknown")
}
