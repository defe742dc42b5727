pub use serde_json;
pub use tokio;
pub use tracing::{debug, error, info, trace, warn};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub mod database;
pub mod error;
pub mod structs;
pub mod sync;
pub mod tcgdex;
pub mod utils;

pub use error::{Error, Result};

///
/// Install the global tracing subscriber.
///
/// `RUST_LOG` is honoured first, then `level` is applied to both dexsync
/// crates. When `file` is set, everything is mirrored (without colors) into
/// that file; keep the returned guard alive until exit or the tail of the
/// log gets lost.
///
pub fn setup_logger(level: &str, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::builder()
        .from_env()
        .map_err(|why| Error::Logger(why.to_string()))?
        .add_directive(crate_directive("dexsync", level)?)
        .add_directive(crate_directive("dexsync_common", level)?);
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false);
    let (file_layer, guard) = match file {
        Some(path) => {
            let directory = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let file_name = match path.file_name() {
                Some(name) => name,
                None => {
                    return Err(Error::Logger(format!(
                        "invalid log file path: {}",
                        path.display()
                    )))
                }
            };
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|why| Error::Logger(why.to_string()))?;
    Ok(guard)
}

fn crate_directive(target: &str, level: &str) -> Result<Directive> {
    format!("{}={}", target, level.to_lowercase())
        .parse::<Directive>()
        .map_err(|why| Error::Logger(format!("invalid log level `{}`: {}", level, why)))
}
