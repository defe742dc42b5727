//! Fetch, diff, merge and persist workflows shared by the CLI commands.

use crate::database::{load_collection, load_index, load_required, save_collection, DataFiles};
use crate::structs::{record_id, Collection};
use crate::tcgdex::{CardSource, Endpoint, Fetcher};
use crate::utils::merge::{merge_catalog, merge_new, CatalogKind, LIST_PROJECTION};
use crate::utils::sanitize::strip_fields;
use crate::Result;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct ListUpdate {
    pub existing: usize,
    pub fetched: usize,
    pub added: Collection,
    pub total: usize,
    pub requests: usize,
    pub complete: bool,
    pub interrupted: bool,
    pub saved: bool,
}

///
/// Add cards the API knows and the list at `path` does not.
///
/// The list is only written when something new was found. An interrupted
/// walk writes nothing; a walk cut short by an error or the page ceiling
/// still merges what it got since merging never removes anything.
///
pub async fn update_list<S: CardSource>(fetcher: &mut Fetcher<S>, path: &Path) -> Result<ListUpdate> {
    let existing = load_collection(path);
    info!("Card list has {} cards", existing.len());
    let paged = fetcher.fetch_paged(Endpoint::Cards).await;
    let mut update = ListUpdate {
        existing: existing.len(),
        fetched: paged.records.len(),
        requests: paged.requests,
        complete: paged.is_complete(),
        interrupted: paged.interrupted,
        ..ListUpdate::default()
    };
    if paged.interrupted {
        warn!("Interrupted after {} requests, card list left untouched", paged.requests);
        update.total = existing.len();
        return Ok(update);
    }
    if !update.complete {
        warn!("Card listing ended early, merging the {} cards received", paged.records.len());
    }
    let merged = merge_new(existing, &paged.records, &LIST_PROJECTION);
    update.total = merged.collection.len();
    update.added = merged.added;
    if update.added.is_empty() {
        info!("No new cards found");
        return Ok(update);
    }
    save_collection(path, merged.collection)?;
    update.saved = true;
    Ok(update)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Only cards missing from the detailed file.
    NewOnly,
    /// Every card of the list.
    Full,
}

#[derive(Debug, Default)]
pub struct DetailedDownload {
    pub listed: usize,
    pub already_detailed: usize,
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_ids: Vec<String>,
    pub interrupted: bool,
    /// Records in the detailed file after saving, `None` when nothing was written.
    pub saved: Option<usize>,
}

///
/// Download full card records for the cards of the basic list.
///
/// The basic list is required. Downloaded records lose `strip` fields and
/// replace any previous copy; cards that fail keep their previous copy.
///
pub async fn download_details<S: CardSource>(
    fetcher: &mut Fetcher<S>,
    files: &DataFiles,
    mode: DownloadMode,
    strip: &[String],
) -> Result<DetailedDownload> {
    let listed = load_required(&files.list)?;
    let mut detailed = load_index(&files.detailed);
    let ids: Vec<String> = listed
        .iter()
        .filter_map(record_id)
        .filter(|id| mode == DownloadMode::Full || !detailed.contains_key(*id))
        .map(str::to_string)
        .collect();
    let mut download = DetailedDownload {
        listed: listed.len(),
        already_detailed: detailed.len(),
        requested: ids.len(),
        ..DetailedDownload::default()
    };
    info!(
        "{} cards listed, {} already detailed, {} to download ({:?})",
        download.listed, download.already_detailed, download.requested, mode
    );
    if ids.is_empty() {
        info!("Every card is already up to date");
        return Ok(download);
    }
    let report = fetcher.fetch_each(Endpoint::Cards, &ids).await;
    download.succeeded = report.succeeded;
    download.failed = report.failed;
    download.failed_ids = report.failed_ids;
    download.interrupted = report.interrupted;
    if report.interrupted {
        warn!(
            "Interrupted after {} downloads, detailed file left untouched",
            report.succeeded + report.failed
        );
        return Ok(download);
    }
    if report.records.is_empty() {
        return Ok(download);
    }
    for mut record in report.records {
        strip_fields(&mut record, strip);
        if let Some(id) = record_id(&record).map(str::to_string) {
            detailed.insert(id, record);
        }
    }
    let saved = save_collection(&files.detailed, detailed.into_values().collect())?;
    download.saved = Some(saved);
    Ok(download)
}

#[derive(Debug, Default)]
pub struct CatalogSync {
    pub existing: usize,
    pub added: usize,
    pub updated: usize,
    pub total: usize,
    pub interrupted: bool,
    pub saved: bool,
}

/// Sync the series or sets file at `path` with its API list.
pub async fn sync_catalog<S: CardSource>(
    fetcher: &mut Fetcher<S>,
    path: &Path,
    kind: CatalogKind,
) -> Result<CatalogSync> {
    let endpoint = match kind {
        CatalogKind::Series => Endpoint::Series,
        CatalogKind::Sets => Endpoint::Sets,
    };
    let existing = load_collection(path);
    let mut sync = CatalogSync {
        existing: existing.len(),
        total: existing.len(),
        ..CatalogSync::default()
    };
    let fetched = match fetcher.fetch_list(endpoint).await? {
        Some(fetched) => fetched,
        None => {
            sync.interrupted = true;
            return Ok(sync);
        }
    };
    let outcome = merge_catalog(existing, &fetched, kind);
    sync.added = outcome.added;
    sync.updated = outcome.updated;
    sync.total = outcome.collection.len();
    if sync.added == 0 && sync.updated == 0 {
        info!("{} already up to date", path.display());
        return Ok(sync);
    }
    save_collection(path, outcome.collection)?;
    sync.saved = true;
    Ok(sync)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::FileNames;
    use crate::structs::record;
    use crate::tcgdex::mock::{fast_settings, MockSource};
    use crate::tcgdex::StopSignal;
    use crate::utils::sanitize::default_price_fields;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    fn fetcher(source: MockSource) -> Fetcher<MockSource> {
        Fetcher::new(source, fast_settings(2, 200), StopSignal::new())
    }

    #[tokio::test]
    async fn list_update_appends_only_unknown_cards() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokemon_list.json");
        fs::write(&path, r#"[{"id": "b2"}, {"id": "a1"}]"#).unwrap();
        let source = MockSource {
            cards: vec![
                record(json!({"id": "a1", "name": "X"})),
                record(json!({"id": "c3", "name": "Y", "image": "https://img/c3"})),
            ],
            ..MockSource::default()
        };
        let mut fetcher = fetcher(source);
        let update = update_list(&mut fetcher, &path).await.unwrap();
        assert!(update.saved && update.complete);
        assert_eq!(update.added, vec![record(json!({"id": "c3", "name": "Y"}))]);
        assert_eq!(
            load_required(&path).unwrap(),
            vec![
                record(json!({"id": "a1"})),
                record(json!({"id": "b2"})),
                record(json!({"id": "c3", "name": "Y"})),
            ]
        );
    }

    #[tokio::test]
    async fn list_without_news_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokemon_list.json");
        fs::write(&path, r#"[{"id": "sv01-001"}]"#).unwrap();
        let mut fetcher = fetcher(MockSource::with_cards(1));
        let update = update_list(&mut fetcher, &path).await.unwrap();
        assert!(!update.saved);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"id": "sv01-001"}]"#);
    }

    #[tokio::test]
    async fn interrupted_listing_leaves_the_list_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokemon_list.json");
        fs::write(&path, r#"[{"id": "sv01-001"}]"#).unwrap();
        let stop = StopSignal::new();
        stop.stop();
        let mut fetcher = Fetcher::new(MockSource::with_cards(3), fast_settings(2, 200), stop);
        let update = update_list(&mut fetcher, &path).await.unwrap();
        assert!(update.interrupted);
        assert!(!update.saved);
        assert_eq!(update.total, 1);
        assert!(update.added.is_empty());
        assert!(fetcher.source().calls().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"id": "sv01-001"}]"#);
    }

    #[tokio::test]
    async fn download_requires_the_card_list() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::new(dir.path(), &FileNames::default());
        let mut fetcher = fetcher(MockSource::with_cards(1));
        let result = download_details(&mut fetcher, &files, DownloadMode::Full, &[]).await;
        assert!(matches!(result, Err(crate::Error::MissingInput(_))));
        assert!(fetcher.source().calls().is_empty());
    }

    #[tokio::test]
    async fn update_mode_downloads_only_missing_cards_and_strips_prices() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::new(dir.path(), &FileNames::default());
        fs::write(
            &files.list,
            r#"[{"id": "sv01-001"}, {"id": "sv01-002"}, {"id": "sv01-003"}]"#,
        )
        .unwrap();
        fs::write(&files.detailed, r#"[{"id": "sv01-002", "hp": 70}]"#).unwrap();
        let mut source = MockSource::default();
        source.cards = vec![
            record(json!({"id": "sv01-001", "name": "A", "pricing": {"avg": 1}})),
            record(json!({"id": "sv01-002", "name": "B"})),
        ];
        let mut fetcher = fetcher(source);
        let download = download_details(
            &mut fetcher,
            &files,
            DownloadMode::NewOnly,
            &default_price_fields(),
        )
        .await
        .unwrap();
        assert_eq!(download.requested, 2);
        assert_eq!((download.succeeded, download.failed), (1, 1));
        assert_eq!(download.failed_ids, vec!["sv01-003"]);
        assert_eq!(download.saved, Some(2));
        assert_eq!(fetcher.source().calls(), vec!["cards/sv01-001", "cards/sv01-003"]);
        assert_eq!(
            load_required(&files.detailed).unwrap(),
            vec![
                record(json!({"id": "sv01-001", "name": "A"})),
                record(json!({"id": "sv01-002", "hp": 70})),
            ]
        );
    }

    #[tokio::test]
    async fn full_mode_replaces_downloaded_cards_and_keeps_failed_ones() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::new(dir.path(), &FileNames::default());
        fs::write(&files.list, r#"[{"id": "a1"}, {"id": "b2"}]"#).unwrap();
        fs::write(&files.detailed, r#"[{"id": "a1", "hp": 1}, {"id": "b2", "hp": 2}]"#).unwrap();
        let source = MockSource {
            cards: vec![
                record(json!({"id": "a1", "hp": 10})),
                record(json!({"id": "b2", "hp": 20})),
            ],
            failing_ids: ["b2".to_string()].into_iter().collect(),
            ..MockSource::default()
        };
        let mut fetcher = fetcher(source);
        let download = download_details(&mut fetcher, &files, DownloadMode::Full, &[])
            .await
            .unwrap();
        assert_eq!(download.requested, 2);
        assert_eq!((download.succeeded, download.failed), (1, 1));
        assert_eq!(download.failed_ids, vec!["b2"]);
        assert_eq!(download.saved, Some(2));
        assert_eq!(fetcher.source().calls(), vec!["cards/a1", "cards/b2"]);
        assert_eq!(
            load_required(&files.detailed).unwrap(),
            vec![
                record(json!({"id": "a1", "hp": 10})),
                record(json!({"id": "b2", "hp": 2})),
            ]
        );
    }

    #[tokio::test]
    async fn interrupted_download_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::new(dir.path(), &FileNames::default());
        fs::write(&files.list, r#"[{"id": "sv01-001"}]"#).unwrap();
        let stop = StopSignal::new();
        stop.stop();
        let mut fetcher = Fetcher::new(MockSource::with_cards(1), fast_settings(2, 200), stop);
        let download = download_details(&mut fetcher, &files, DownloadMode::Full, &[])
            .await
            .unwrap();
        assert!(download.interrupted);
        assert_eq!(download.saved, None);
        assert!(!files.detailed.exists());
    }

    #[tokio::test]
    async fn catalog_sync_adds_and_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokemon_series.json");
        fs::write(&path, r#"[{"id": "sv", "name": "Scarlet", "logo": ""}]"#).unwrap();
        let source = MockSource {
            series: vec![
                record(json!({"id": "sv", "name": "Escarlate e Violeta"})),
                record(json!({"id": "base", "name": "Base"})),
            ],
            ..MockSource::default()
        };
        let mut fetcher = fetcher(source);
        let sync = sync_catalog(&mut fetcher, &path, CatalogKind::Series).await.unwrap();
        assert_eq!((sync.added, sync.updated, sync.total), (1, 1, 2));
        assert!(sync.saved);
        let saved = load_required(&path).unwrap();
        assert_eq!(saved[0]["id"], json!("base"));
        assert_eq!(saved[1]["name"], json!("Escarlate e Violeta"));
    }
}
