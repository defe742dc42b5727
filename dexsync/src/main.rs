use clap::Parser;
use dotenvy::dotenv;
use dexsync_common::*;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::helper::Completion;

mod cli;
mod commands;
mod config;
mod helper;

const API_HOME: &str = "https://tcgdex.dev";

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(why) = dotenv() {
        if !why.not_found() {
            eprintln!("Failed to load .env: {:?}", why);
        }
    }
    let cli = Cli::parse();
    let config = match Config::load_or_create(&cli.config) {
        Ok(config) => config,
        Err(why) => {
            eprintln!("{}", why);
            return ExitCode::FAILURE;
        }
    };
    let log_level = env::var("LOG_LEVEL").unwrap_or(config.log.level.clone());
    let log_file = match config.log.file.enabled {
        true => Some(PathBuf::from(&config.log.file.path)),
        false => None,
    };
    // Dropping the guard flushes the log file.
    let _log_guard = match setup_logger(&log_level, log_file.as_deref()) {
        Ok(guard) => guard,
        Err(why) => {
            eprintln!("{}", why);
            return ExitCode::FAILURE;
        }
    };
    info!("dexsync v{} - data from {}", env!("CARGO_PKG_VERSION"), API_HOME);
    debug!("Log level: {}", log_level);
    let files = config.data_files(cli.data_dir.as_deref());
    debug!("Data directory: {}", files.dir.display());
    let result = match cli.command {
        Command::List => commands::fetch::list(&config, &files).await,
        Command::Download { update } => commands::fetch::download(&config, &files, update).await,
        Command::Catalog => commands::fetch::catalog(&config, &files).await,
        Command::StripPrices => commands::clean::strip_prices(&config, &files),
        Command::Exclude => commands::clean::exclude(&config, &files),
        Command::Report => commands::report::report(&files),
        Command::FixSeries { prefix } => commands::clean::fix_series(&files, &prefix),
    };
    match result {
        Ok(Completion::Interrupted) => {
            warn!("Stopped by user");
            Completion::Interrupted.exit_code()
        }
        Ok(completion) => completion.exit_code(),
        Err(Error::MissingInput(path)) => {
            error!("Required file {} not found", path.display());
            ExitCode::FAILURE
        }
        Err(why) => {
            error!("{}", why);
            ExitCode::FAILURE
        }
    }
}
