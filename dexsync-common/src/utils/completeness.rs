use crate::structs::{record_id, record_name, Record};
use serde_json::Value;

const EXAMPLE_LIMIT: usize = 5;
const POKEMON_FIELDS: [&str; 5] = ["hp", "types", "attacks", "stage", "retreat"];
const NON_POKEMON_FIELDS: [&str; 2] = ["types", "attacks"];

/// How much of a field a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Missing or `null`.
    Absent,
    /// Present but `""`, `[]` or `{}`. Numbers and booleans, zero and
    /// `false` included, are always filled.
    Empty,
    Filled,
}

impl FieldState {
    pub fn of(value: Option<&Value>) -> FieldState {
        match value {
            None | Some(Value::Null) => FieldState::Absent,
            Some(Value::String(s)) if s.is_empty() => FieldState::Empty,
            Some(Value::Array(items)) if items.is_empty() => FieldState::Empty,
            Some(Value::Object(map)) if map.is_empty() => FieldState::Empty,
            Some(_) => FieldState::Filled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Pokemon,
    Trainer,
    Energy,
    Unknown,
}

impl Category {
    /// Accepts the English and Portuguese spellings the API uses.
    pub fn of(record: &Record) -> Category {
        let category = record
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        match category.as_str() {
            "pokemon" | "pokémon" => Category::Pokemon,
            "trainer" | "treinador" => Category::Trainer,
            "energy" | "energia" => Category::Energy,
            _ => Category::Unknown,
        }
    }
}

///
/// Whether a detailed card is still missing gameplay data.
///
/// * Pokémon: `hp`, `types`, `attacks`, `stage` and `retreat` must all be
///   filled. An empty list or string counts as missing; a zero `retreat`
///   is a real value.
/// * Trainer and Energy: `types` and `attacks` must be present; they are
///   allowed to be empty.
/// * Anything else, including a card without category, needs an update.
///
pub fn needs_update(record: &Record) -> bool {
    match Category::of(record) {
        Category::Pokemon => POKEMON_FIELDS
            .iter()
            .any(|field| FieldState::of(record.get(*field)) != FieldState::Filled),
        Category::Trainer | Category::Energy => NON_POKEMON_FIELDS
            .iter()
            .any(|field| FieldState::of(record.get(*field)) == FieldState::Absent),
        Category::Unknown => true,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTally {
    pub total: usize,
    pub needing_update: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub id: String,
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Default)]
pub struct CompletenessReport {
    pub pokemon: CategoryTally,
    pub trainer: CategoryTally,
    pub energy: CategoryTally,
    pub unknown: CategoryTally,
    /// First few cards needing an update, in file order.
    pub examples: Vec<Example>,
}

impl CompletenessReport {
    pub fn total(&self) -> usize {
        self.tallies().iter().map(|(_, tally)| tally.total).sum()
    }

    pub fn needing_update(&self) -> usize {
        self.tallies().iter().map(|(_, tally)| tally.needing_update).sum()
    }

    pub fn tallies(&self) -> [(Category, CategoryTally); 4] {
        [
            (Category::Pokemon, self.pokemon),
            (Category::Trainer, self.trainer),
            (Category::Energy, self.energy),
            (Category::Unknown, self.unknown),
        ]
    }

    fn tally_mut(&mut self, category: Category) -> &mut CategoryTally {
        match category {
            Category::Pokemon => &mut self.pokemon,
            Category::Trainer => &mut self.trainer,
            Category::Energy => &mut self.energy,
            Category::Unknown => &mut self.unknown,
        }
    }
}

pub fn assess(records: &[Record]) -> CompletenessReport {
    let mut report = CompletenessReport::default();
    for record in records {
        let category = Category::of(record);
        let incomplete = needs_update(record);
        let tally = report.tally_mut(category);
        tally.total += 1;
        if !incomplete {
            continue;
        }
        tally.needing_update += 1;
        if report.examples.len() < EXAMPLE_LIMIT {
            report.examples.push(Example {
                id: record_id(record).unwrap_or("Unknown").to_string(),
                name: record_name(record).unwrap_or("Unknown").to_string(),
                category,
            });
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::record;
    use serde_json::json;

    fn full_pokemon(id: &str) -> Record {
        record(json!({
            "id": id,
            "name": "Pikachu",
            "category": "Pokemon",
            "hp": 60,
            "types": ["Elétrico"],
            "attacks": [{"name": "Choque do Trovão"}],
            "stage": "Básico",
            "retreat": 1,
        }))
    }

    #[test]
    fn field_states_are_distinct() {
        assert_eq!(FieldState::of(None), FieldState::Absent);
        assert_eq!(FieldState::of(Some(&Value::Null)), FieldState::Absent);
        assert_eq!(FieldState::of(Some(&json!([]))), FieldState::Empty);
        assert_eq!(FieldState::of(Some(&json!({}))), FieldState::Empty);
        assert_eq!(FieldState::of(Some(&json!(0))), FieldState::Filled);
        assert_eq!(FieldState::of(Some(&json!(false))), FieldState::Filled);
        assert_eq!(FieldState::of(Some(&json!(""))), FieldState::Empty);
        assert_eq!(FieldState::of(Some(&json!(["Fogo"]))), FieldState::Filled);
        assert_eq!(FieldState::of(Some(&json!(2))), FieldState::Filled);
    }

    #[test]
    fn complete_pokemon_needs_nothing() {
        assert!(!needs_update(&full_pokemon("sv01-001")));
    }

    #[test]
    fn free_retreat_is_not_missing_data() {
        let mut card = full_pokemon("sv03.5-025");
        card.insert("retreat".to_string(), json!(0));
        assert!(!needs_update(&card));
        let report = assess(&[card]);
        assert_eq!(report.pokemon.needing_update, 0);
        assert!(report.examples.is_empty());
    }

    #[test]
    fn pokemon_with_empty_attacks_needs_update() {
        let mut card = full_pokemon("sv01-001");
        card.insert("attacks".to_string(), json!([]));
        assert!(needs_update(&card));
        card.remove("attacks");
        assert!(needs_update(&card));
    }

    #[test]
    fn trainer_may_have_empty_lists_but_not_missing_ones() {
        let empty = record(json!({"id": "t1", "category": "Trainer", "types": [], "attacks": []}));
        assert!(!needs_update(&empty));
        let missing = record(json!({"id": "t2", "category": "Treinador", "types": []}));
        assert!(needs_update(&missing));
        let null = record(json!({"id": "e1", "category": "Energy", "types": null, "attacks": []}));
        assert!(needs_update(&null));
    }

    #[test]
    fn unknown_category_always_needs_update() {
        assert!(needs_update(&record(json!({"id": "x1"}))));
        assert!(needs_update(&record(json!({"id": "x2", "category": "Item"}))));
    }

    #[test]
    fn assess_tallies_per_category_and_caps_examples() {
        let mut records = vec![full_pokemon("sv01-001")];
        for n in 0..6 {
            records.push(record(json!({"id": format!("x{}", n), "name": "Mystery"})));
        }
        records.push(record(json!({"id": "e1", "category": "Energia", "types": [], "attacks": []})));
        let report = assess(&records);
        assert_eq!(report.total(), 8);
        assert_eq!(report.pokemon, CategoryTally { total: 1, needing_update: 0 });
        assert_eq!(report.energy, CategoryTally { total: 1, needing_update: 0 });
        assert_eq!(report.unknown, CategoryTally { total: 6, needing_update: 6 });
        assert_eq!(report.needing_update(), 6);
        assert_eq!(report.examples.len(), 5);
        assert_eq!(report.examples[0].id, "x0");
        assert_eq!(report.examples[0].category, Category::Unknown);
    }
}
