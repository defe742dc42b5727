use crate::config::Config;
use crate::helper::{self, Completion};
use dexsync_common::database::DataFiles;
use dexsync_common::structs::{record_id, record_name};
use dexsync_common::sync::{self, DownloadMode, ListUpdate};
use dexsync_common::tcgdex::StopSignal;
use dexsync_common::utils::merge::CatalogKind;
use dexsync_common::{error, info, warn, Result};

const SHOWN_NEW_CARDS: usize = 5;

pub async fn list(config: &Config, files: &DataFiles) -> Result<Completion> {
    info!("Updating card list {}", files.list.display());
    files.ensure_dir()?;
    let mut fetcher = helper::fetcher(&config.api, StopSignal::listen_for_ctrl_c())?;
    let update = sync::update_list(&mut fetcher, &files.list).await?;
    if update.interrupted {
        return Ok(list_completion(&update));
    }
    helper::section("Card list");
    info!("Existing cards: {}", update.existing);
    info!("Cards from the API: {}", update.fetched);
    info!("New cards: {}", update.added.len());
    info!("Total: {}", update.total);
    for card in update.added.iter().take(SHOWN_NEW_CARDS) {
        info!(
            "  - {} ({})",
            record_name(card).unwrap_or("?"),
            record_id(card).unwrap_or("?")
        );
    }
    if update.added.len() > SHOWN_NEW_CARDS {
        info!("  ... and {} more", update.added.len() - SHOWN_NEW_CARDS);
    }
    Ok(list_completion(&update))
}

fn list_completion(update: &ListUpdate) -> Completion {
    if update.interrupted {
        Completion::Interrupted
    } else if !update.complete {
        warn!("Card listing did not reach the end, run again to finish it");
        Completion::Incomplete
    } else {
        Completion::Finished
    }
}

pub async fn download(config: &Config, files: &DataFiles, update: bool) -> Result<Completion> {
    let mode = if update {
        DownloadMode::NewOnly
    } else {
        DownloadMode::Full
    };
    files.ensure_dir()?;
    let mut fetcher = helper::fetcher(&config.api, StopSignal::listen_for_ctrl_c())?;
    let download =
        sync::download_details(&mut fetcher, files, mode, &config.sanitize.fields).await?;
    helper::section("Detailed download");
    info!("Succeeded: {}", download.succeeded);
    info!("Failed: {}", download.failed);
    if let Some(saved) = download.saved {
        info!("Cards in {}: {}", files.detailed.display(), saved);
    }
    if download.interrupted {
        warn!("Download interrupted, nothing was saved");
        return Ok(Completion::Interrupted);
    }
    if download.failed > 0 {
        warn!(
            "{} cards failed, run again to retry them: {}",
            download.failed,
            download.failed_ids.join(", ")
        );
    }
    Ok(Completion::Finished)
}

pub async fn catalog(config: &Config, files: &DataFiles) -> Result<Completion> {
    files.ensure_dir()?;
    let mut fetcher = helper::fetcher(&config.api, StopSignal::listen_for_ctrl_c())?;
    let mut completion = Completion::Finished;
    let targets = [
        (CatalogKind::Series, files.series.as_path()),
        (CatalogKind::Sets, files.sets.as_path()),
    ];
    for (kind, path) in targets {
        if fetcher.is_stopped() {
            return Ok(Completion::Interrupted);
        }
        info!("Syncing {:?} into {}", kind, path.display());
        match sync::sync_catalog(&mut fetcher, path, kind).await {
            Ok(outcome) if outcome.interrupted => return Ok(Completion::Interrupted),
            Ok(outcome) => {
                info!(
                    "{:?}: {} new, {} updated, {} total",
                    kind, outcome.added, outcome.updated, outcome.total
                );
            }
            Err(why) => {
                error!("Failed to sync {:?}: {}", kind, why);
                completion = Completion::Incomplete;
            }
        }
    }
    Ok(completion)
}
