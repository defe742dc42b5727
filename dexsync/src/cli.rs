use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dexsync", version, about = "Maintain the offline TCGdex card dataset")]
pub struct Cli {
    /// Configuration file, created with defaults when missing
    #[arg(long, env = "DEXSYNC_CONFIG", default_value = "dexsync.toml")]
    pub config: PathBuf,

    /// Data directory, overrides `data.dir` from the configuration
    #[arg(long, env = "DEXSYNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Add cards the API knows about to the basic card list
    List,
    /// Download detailed records for the cards of the basic list
    Download {
        /// Only download cards missing from the detailed file
        #[arg(long)]
        update: bool,
    },
    /// Sync the series and sets files with the API
    Catalog,
    /// Remove pricing fields from the detailed cards
    StripPrices,
    /// Drop records matching the exclusion rules from every data file
    Exclude,
    /// Count detailed cards that are still missing gameplay data
    Report,
    /// Set the series of every set whose id starts with a prefix
    FixSeries {
        #[arg(long, default_value = "sv")]
        prefix: String,
    },
}
