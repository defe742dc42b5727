pub mod client;

pub use async_trait::async_trait;
pub use client::TcgdexClient;

use crate::structs::{Collection, Record};
use crate::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Remote list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Cards,
    Sets,
    Series,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Cards => "cards",
            Endpoint::Sets => "sets",
            Endpoint::Series => "series",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

///
/// Where card data comes from.
///
/// Every call is a single outbound request; pacing and bookkeeping live in
/// [`Fetcher`].
///
#[async_trait]
pub trait CardSource: Send + Sync {
    async fn fetch_record(&self, endpoint: Endpoint, id: &str) -> Result<Record>;
    async fn fetch_page(&self, endpoint: Endpoint, limit: usize, offset: usize)
        -> Result<Collection>;
    async fn fetch_list(&self, endpoint: Endpoint) -> Result<Collection>;
}

/// Set once the user asked the run to stop. Checked before every request.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> StopSignal {
        StopSignal::default()
    }

    ///
    /// Spawn a task that raises the signal on the first Ctrl-C.
    ///
    /// A second Ctrl-C exits right away with status 130.
    /// Must be called from inside a tokio runtime.
    ///
    pub fn listen_for_ctrl_c() -> StopSignal {
        let signal = StopSignal::new();
        let handle = signal.clone();
        tokio::spawn(async move {
            if let Err(why) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", why);
                return;
            }
            warn!("Interrupted, stopping before the next request (Ctrl-C again to abort)");
            handle.stop();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        });
        signal
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pacing and limits applied by [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub delay: Duration,
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for FetchSettings {
    fn default() -> FetchSettings {
        FetchSettings {
            delay: Duration::from_millis(500),
            page_size: 100,
            max_pages: 200,
        }
    }
}

/// Result of fetching records one id at a time.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub records: Collection,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_ids: Vec<String>,
    pub interrupted: bool,
}

/// Result of walking a paginated list.
#[derive(Debug, Default)]
pub struct PagedFetch {
    pub records: Collection,
    pub requests: usize,
    pub hit_ceiling: bool,
    pub interrupted: bool,
    pub error: Option<String>,
}

impl PagedFetch {
    /// True when the list ended with an empty page.
    pub fn is_complete(&self) -> bool {
        !self.hit_ceiling && !self.interrupted && self.error.is_none()
    }
}

///
/// Sequential driver over a [`CardSource`].
///
/// Requests never overlap and are spaced by a fixed delay. Failures are
/// logged and counted, never retried.
///
pub struct Fetcher<S> {
    source: S,
    settings: FetchSettings,
    stop: StopSignal,
    requests: usize,
}

impl<S: CardSource> Fetcher<S> {
    pub fn new(source: S, settings: FetchSettings, stop: StopSignal) -> Fetcher<S> {
        Fetcher {
            source,
            settings,
            stop,
            requests: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Requests issued so far by this fetcher.
    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    // Sleeps before every request except the first one.
    async fn pace(&mut self) {
        if self.requests > 0 && !self.settings.delay.is_zero() {
            tokio::time::sleep(self.settings.delay).await;
        }
        self.requests += 1;
    }

    pub async fn fetch_each(&mut self, endpoint: Endpoint, ids: &[String]) -> FetchReport {
        let mut report = FetchReport::default();
        let total = ids.len();
        for (index, id) in ids.iter().enumerate() {
            if self.stop.is_stopped() {
                report.interrupted = true;
                break;
            }
            self.pace().await;
            if self.stop.is_stopped() {
                report.interrupted = true;
                break;
            }
            match self.source.fetch_record(endpoint, id).await {
                Ok(record) => {
                    info!("[{}/{}] Fetched {}", index + 1, total, id);
                    report.records.push(record);
                    report.succeeded += 1;
                }
                Err(why) => {
                    error!("[{}/{}] Failed to fetch {}: {}", index + 1, total, id, why);
                    report.failed += 1;
                    report.failed_ids.push(id.clone());
                }
            }
        }
        report
    }

    ///
    /// Walk `endpoint` page by page from offset 0.
    ///
    /// Stops on the first empty page, after `max_pages` non-empty pages, on
    /// the first error (what was collected so far is kept) or when the stop
    /// signal is raised.
    ///
    pub async fn fetch_paged(&mut self, endpoint: Endpoint) -> PagedFetch {
        let mut result = PagedFetch::default();
        let page_size = self.settings.page_size;
        let mut offset = 0;
        let mut pages = 0;
        loop {
            if pages >= self.settings.max_pages {
                warn!(
                    "Stopped {} after {} pages, the list may be incomplete",
                    endpoint, pages
                );
                result.hit_ceiling = true;
                break;
            }
            if self.stop.is_stopped() {
                result.interrupted = true;
                break;
            }
            self.pace().await;
            result.requests += 1;
            match self.source.fetch_page(endpoint, page_size, offset).await {
                Ok(page) if page.is_empty() => {
                    trace!("Page {} of {} is empty, done", pages + 1, endpoint);
                    break;
                }
                Ok(page) => {
                    pages += 1;
                    debug!("Page {} of {}: {} records", pages, endpoint, page.len());
                    result.records.extend(page);
                    offset += page_size;
                }
                Err(why) => {
                    error!("Failed to fetch page {} of {}: {}", pages + 1, endpoint, why);
                    result.error = Some(why.to_string());
                    break;
                }
            }
        }
        info!(
            "Fetched {} {} records in {} requests",
            result.records.len(),
            endpoint,
            result.requests
        );
        result
    }

    /// Fetch an unpaginated list. `Ok(None)` means the stop signal was raised.
    pub async fn fetch_list(&mut self, endpoint: Endpoint) -> Result<Option<Collection>> {
        if self.stop.is_stopped() {
            return Ok(None);
        }
        self.pace().await;
        let records = self.source.fetch_list(endpoint).await?;
        info!("Fetched {} {} records", records.len(), endpoint);
        Ok(Some(records))
    }
}
