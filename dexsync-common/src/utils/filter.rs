use crate::structs::{record_id, record_name, Collection, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Decides which records are dropped from the dataset.
pub trait RecordFilter {
    fn excludes(&self, record: &Record) -> bool;
}

impl<F> RecordFilter for F
where
    F: Fn(&Record) -> bool,
{
    fn excludes(&self, record: &Record) -> bool {
        self(record)
    }
}

///
/// String-matching rules for an unwanted group of records.
///
/// A record is excluded as soon as any one rule matches a field it has:
///
/// * `id_prefixes`: the id starts with one of them (case-sensitive)
/// * `id_contains` / `name_contains`: case-insensitive substring
/// * `series_codes`: `series` equals one of them, either as a plain string
///   or as the `id` of a nested series object
/// * `reference_prefixes`: the `set` reference starts with one of them,
///   either as a plain string or as the `id` of a nested set object
///
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ExclusionRules {
    pub id_prefixes: Vec<String>,
    pub id_contains: Vec<String>,
    pub name_contains: Vec<String>,
    pub series_codes: Vec<String>,
    pub reference_prefixes: Vec<String>,
}

impl ExclusionRules {
    /// Rules for the Mega Evolution expansion (`me` series).
    pub fn mega_evolution() -> ExclusionRules {
        let words = vec!["mega".to_string(), "megaevolução".to_string()];
        ExclusionRules {
            id_prefixes: vec!["me".to_string()],
            id_contains: words.clone(),
            name_contains: words,
            series_codes: vec!["me".to_string()],
            reference_prefixes: vec!["me".to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id_prefixes.is_empty()
            && self.id_contains.is_empty()
            && self.name_contains.is_empty()
            && self.series_codes.is_empty()
            && self.reference_prefixes.is_empty()
    }

    fn id_matches(&self, record: &Record) -> bool {
        let id = match record_id(record) {
            Some(id) => id,
            None => return false,
        };
        starts_with_any(id, &self.id_prefixes) || contains_any(id, &self.id_contains)
    }

    fn name_matches(&self, record: &Record) -> bool {
        match record_name(record) {
            Some(name) => contains_any(name, &self.name_contains),
            None => false,
        }
    }

    fn series_matches(&self, record: &Record) -> bool {
        match nested_id(record.get("series")) {
            Some(code) => self.series_codes.iter().any(|wanted| wanted == code),
            None => false,
        }
    }

    fn reference_matches(&self, record: &Record) -> bool {
        match nested_id(record.get("set")) {
            Some(set_id) => starts_with_any(set_id, &self.reference_prefixes),
            None => false,
        }
    }
}

impl RecordFilter for ExclusionRules {
    fn excludes(&self, record: &Record) -> bool {
        self.id_matches(record)
            || self.name_matches(record)
            || self.series_matches(record)
            || self.reference_matches(record)
    }
}

// A reference is either the id itself or an object carrying one.
fn nested_id(value: Option<&Value>) -> Option<&str> {
    match value? {
        Value::String(id) => Some(id),
        Value::Object(nested) => record_id(nested),
        _ => None,
    }
}

fn starts_with_any(value: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| value.starts_with(prefix.as_str()))
}

fn contains_any(value: &str, needles: &[String]) -> bool {
    if needles.is_empty() {
        return false;
    }
    let value = value.to_lowercase();
    needles
        .iter()
        .any(|needle| value.contains(&needle.to_lowercase()))
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Collection,
    pub removed: Collection,
}

/// Split `records` into the ones to keep and the ones `filter` excludes.
pub fn retain_wanted<F: RecordFilter + ?Sized>(records: Collection, filter: &F) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for record in records {
        if filter.excludes(&record) {
            trace!(
                "Excluding {} ({})",
                record_id(&record).unwrap_or("?"),
                record_name(&record).unwrap_or("?")
            );
            outcome.removed.push(record);
        } else {
            outcome.kept.push(record);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::record;
    use serde_json::json;

    fn rules() -> ExclusionRules {
        ExclusionRules::mega_evolution()
    }

    #[test]
    fn mega_card_is_excluded_and_regular_card_kept() {
        assert!(rules().excludes(&record(json!({"id": "me01-001", "name": "Mega X"}))));
        assert!(!rules().excludes(&record(json!({"id": "sv01-001", "name": "Pikachu"}))));
    }

    #[test]
    fn id_prefix_wins_over_everything_else() {
        let card = record(json!({
            "id": "me02-010",
            "name": "Pikachu",
            "series": "sv",
            "set": {"id": "sv01"},
        }));
        assert!(rules().excludes(&card));
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let card = record(json!({"id": "xy01-001", "name": "MEGAEVOLUÇÃO Venusaur"}));
        assert!(rules().excludes(&card));
    }

    #[test]
    fn series_code_must_match_exactly() {
        assert!(rules().excludes(&record(json!({"id": "p1", "series": "me"}))));
        assert!(!rules().excludes(&record(json!({"id": "p1", "series": "mew"}))));
        assert!(rules().excludes(&record(json!({"id": "p1", "series": {"id": "me", "name": "Megaevolução"}}))));
    }

    #[test]
    fn nested_set_reference_is_checked() {
        assert!(rules().excludes(&record(json!({"id": "x-1", "set": {"id": "me01", "name": "Mega"}}))));
        assert!(rules().excludes(&record(json!({"id": "x-1", "set": "me01"}))));
        assert!(!rules().excludes(&record(json!({"id": "x-1", "set": {"id": "sv01"}}))));
        assert!(!rules().excludes(&record(json!({"id": "x-1", "set": {"name": "no id"}}))));
    }

    #[test]
    fn record_without_matching_fields_is_kept_unchanged() {
        let records = vec![
            record(json!({"id": "sv01-001", "name": "Pikachu", "set": {"id": "sv01"}})),
            record(json!({"id": "me01-002", "name": "Mega Lucario"})),
        ];
        let before = records[0].clone();
        let outcome = retain_wanted(records, &rules());
        assert_eq!(outcome.kept, vec![before]);
        assert_eq!(outcome.removed.len(), 1);
    }

    #[test]
    fn closures_can_replace_the_rules() {
        let only_energy = |record: &Record| record.get("category") == Some(&json!("Energy"));
        let outcome = retain_wanted(
            vec![
                record(json!({"id": "a", "category": "Energy"})),
                record(json!({"id": "b", "category": "Pokemon"})),
            ],
            &only_energy,
        );
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept[0]["id"], json!("b"));
    }

    #[test]
    fn empty_rules_keep_everything() {
        let empty = ExclusionRules::default();
        assert!(empty.is_empty());
        assert!(!empty.excludes(&record(json!({"id": "me01-001", "name": "Mega X"}))));
    }

    #[test]
    fn rules_deserialize_with_missing_sections() {
        let rules: ExclusionRules =
            serde_json::from_value(json!({"id_prefixes": ["me"]})).unwrap();
        assert_eq!(rules.id_prefixes, vec!["me"]);
        assert!(rules.name_contains.is_empty());
    }
}
