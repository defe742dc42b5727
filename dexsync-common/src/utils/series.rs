use crate::structs::{record_id, Collection};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeriesFix {
    /// Ids that start with the prefix.
    pub matched: Vec<String>,
    /// How many of those had a different `series`.
    pub fixed: usize,
}

///
/// Point every set whose id starts with `prefix` at the series `prefix`.
///
/// Sub-sets such as `sv03.5` or `sv10.5w` tend to come back from the API
/// attached to the wrong series.
///
pub fn fix_series_prefix(sets: &mut Collection, prefix: &str) -> SeriesFix {
    let mut result = SeriesFix::default();
    for set in sets.iter_mut() {
        let id = match record_id(set) {
            Some(id) if id.starts_with(prefix) => id.to_string(),
            _ => continue,
        };
        if set.get("series").and_then(Value::as_str) != Some(prefix) {
            info!("Fixing {}: {:?} -> {:?}", id, set.get("series"), prefix);
            set.insert("series".to_string(), Value::String(prefix.to_string()));
            result.fixed += 1;
        }
        result.matched.push(id);
    }
    result
}
