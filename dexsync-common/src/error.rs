use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("required input `{0}` not found")]
    MissingInput(PathBuf),

    #[error("`{path}` is not a record collection: {reason}")]
    InvalidShape { path: PathBuf, reason: String },

    #[error("invalid api url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    #[error("logger setup failed: {0}")]
    Logger(String),
}
