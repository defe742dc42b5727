use crate::structs::Record;
use tracing::trace;

/// Marketplace and pricing keys the offline dataset does not carry.
pub const PRICE_FIELDS: [&str; 9] = [
    "price",
    "prices",
    "cardmarket",
    "tcgplayer",
    "ebay",
    "amazon",
    "coolstuffinc",
    "pokemon",
    "pricing",
];

pub fn default_price_fields() -> Vec<String> {
    PRICE_FIELDS.iter().map(|field| field.to_string()).collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeReport {
    pub records_touched: usize,
    pub fields_removed: usize,
}

///
/// Remove every key in `fields` from `record` and return how many were there.
///
/// `id` is never removed, even if listed. Remaining keys keep their order.
///
pub fn strip_fields(record: &mut Record, fields: &[String]) -> usize {
    let mut removed = 0;
    for field in fields {
        if field == "id" {
            continue;
        }
        if record.shift_remove(field.as_str()).is_some() {
            removed += 1;
        }
    }
    removed
}

pub fn strip_collection(records: &mut [Record], fields: &[String]) -> SanitizeReport {
    let mut report = SanitizeReport::default();
    for record in records.iter_mut() {
        let removed = strip_fields(record, fields);
        if removed > 0 {
            trace!("Removed {} fields from {:?}", removed, record.get("id"));
            report.records_touched += 1;
            report.fields_removed += removed;
        }
    }
    report
}
