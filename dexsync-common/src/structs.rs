use serde_json::{Map, Value};
use std::collections::HashSet;

/// One catalog entry (card, set or series). Field order is preserved.
pub type Record = Map<String, Value>;

/// Records as they are stored on disk: a JSON array.
pub type Collection = Vec<Record>;

pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

pub fn record_name(record: &Record) -> Option<&str> {
    record.get("name").and_then(Value::as_str)
}

/// Ids known to a collection, used to diff against freshly fetched data.
pub fn id_index(records: &[Record]) -> HashSet<String> {
    records
        .iter()
        .filter_map(record_id)
        .map(str::to_string)
        .collect()
}

/// Copy only `fields` out of `record`, in the order given. Absent fields are skipped.
pub fn project(record: &Record, fields: &[&str]) -> Record {
    let mut projected = Record::new();
    for field in fields {
        if let Some(value) = record.get(*field) {
            projected.insert(field.to_string(), value.clone());
        }
    }
    projected
}

///
/// Check that `value` is an array of objects each carrying a string `id`.
///
/// The error is a human readable reason, callers attach the path or url.
///
pub fn into_collection(value: Value) -> Result<Collection, String> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(format!("expected an array, found {}", kind_of(&other))),
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let record = match item {
            Value::Object(record) => record,
            other => {
                return Err(format!(
                    "element {} is {}, not an object",
                    index,
                    kind_of(&other)
                ))
            }
        };
        if record_id(&record).is_none() {
            return Err(format!("element {} has no string `id`", index));
        }
        records.push(record);
    }
    Ok(records)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}
