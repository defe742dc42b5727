use crate::config::Api;
use dexsync_common::tcgdex::{FetchSettings, Fetcher, StopSignal, TcgdexClient};
use dexsync_common::{info, Result};
use std::process::ExitCode;

/// How a command ended when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Finished,
    /// Stopped by Ctrl-C, nothing written past that point.
    Interrupted,
    /// Ran to the end but some part of the work failed.
    Incomplete,
}

impl Completion {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Completion::Finished => ExitCode::SUCCESS,
            Completion::Interrupted => ExitCode::from(130),
            Completion::Incomplete => ExitCode::FAILURE,
        }
    }
}

pub fn fetcher(api: &Api, stop: StopSignal) -> Result<Fetcher<TcgdexClient>> {
    let client = TcgdexClient::new(&api.base_url, api.timeout(), &api.user_agent)?;
    info!("Using {}", client.base_url());
    let settings = FetchSettings {
        delay: api.request_delay(),
        page_size: api.page_size,
        max_pages: api.max_pages,
    };
    Ok(Fetcher::new(client, settings, stop))
}

pub fn section(title: &str) {
    info!("{}", "=".repeat(50));
    info!("{}", title);
}
