use crate::config::Config;
use crate::helper::{self, Completion};
use dexsync_common::database::{load_required, save_collection, DataFiles};
use dexsync_common::utils::filter::retain_wanted;
use dexsync_common::utils::sanitize::strip_collection;
use dexsync_common::utils::series::fix_series_prefix;
use dexsync_common::{error, info, warn, Result};
use std::path::Path;

pub fn strip_prices(config: &Config, files: &DataFiles) -> Result<Completion> {
    let mut cards = load_required(&files.detailed)?;
    info!("Stripping {:?} from {} cards", config.sanitize.fields, cards.len());
    let report = strip_collection(&mut cards, &config.sanitize.fields);
    if report.fields_removed == 0 {
        info!("No pricing fields found, {} left untouched", files.detailed.display());
        return Ok(Completion::Finished);
    }
    save_collection(&files.detailed, cards)?;
    info!(
        "Removed {} fields from {} cards",
        report.fields_removed, report.records_touched
    );
    Ok(Completion::Finished)
}

pub fn exclude(config: &Config, files: &DataFiles) -> Result<Completion> {
    if config.exclude.is_empty() {
        warn!("No exclusion rules configured, nothing to do");
        return Ok(Completion::Finished);
    }
    let labelled = files.labelled();
    let mut failed = 0;
    for (label, path) in labelled {
        match exclude_from(config, label, path) {
            Ok(()) => {}
            Err(why) => {
                error!("Failed to process {} ({}): {}", label, path.display(), why);
                failed += 1;
            }
        }
    }
    helper::section("Exclusion");
    info!(
        "Files processed: {}/{}",
        labelled.len() - failed,
        labelled.len()
    );
    if failed > 0 {
        return Ok(Completion::Incomplete);
    }
    Ok(Completion::Finished)
}

fn exclude_from(config: &Config, label: &str, path: &Path) -> Result<()> {
    let records = load_required(path)?;
    let before = records.len();
    let outcome = retain_wanted(records, &config.exclude);
    info!(
        "{}: {} records, {} removed, {} kept",
        label,
        before,
        outcome.removed.len(),
        outcome.kept.len()
    );
    if !outcome.removed.is_empty() {
        save_collection(path, outcome.kept)?;
    }
    Ok(())
}

pub fn fix_series(files: &DataFiles, prefix: &str) -> Result<Completion> {
    let mut sets = load_required(&files.sets)?;
    let fix = fix_series_prefix(&mut sets, prefix);
    info!(
        "{} sets start with {:?}: {}",
        fix.matched.len(),
        prefix,
        fix.matched.join(", ")
    );
    if fix.fixed == 0 {
        info!("Every {:?} set already has the right series", prefix);
        return Ok(Completion::Finished);
    }
    save_collection(&files.sets, sets)?;
    info!("Fixed {} sets", fix.fixed);
    Ok(Completion::Finished)
}
