use crate::helper::{self, Completion};
use dexsync_common::database::{load_required, DataFiles};
use dexsync_common::utils::completeness::{assess, Category};
use dexsync_common::{info, Result};

fn label(category: Category) -> &'static str {
    match category {
        Category::Pokemon => "Pokémon",
        Category::Trainer => "Trainer",
        Category::Energy => "Energy",
        Category::Unknown => "Unknown",
    }
}

pub fn report(files: &DataFiles) -> Result<Completion> {
    let cards = load_required(&files.detailed)?;
    info!("Checking {} cards in {}", cards.len(), files.detailed.display());
    let report = assess(&cards);
    helper::section("Completeness by category");
    for (category, tally) in report.tallies() {
        info!(
            "{}: {} total, {} need an update",
            label(category),
            tally.total,
            tally.needing_update
        );
    }
    info!("Total needing an update: {}", report.needing_update());
    if !report.examples.is_empty() {
        info!("Examples:");
        for example in &report.examples {
            info!(
                "  - {} ({}) - {}",
                example.name,
                example.id,
                label(example.category)
            );
        }
    }
    Ok(Completion::Finished)
}
