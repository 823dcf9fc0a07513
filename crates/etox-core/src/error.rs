// crates/etox-core/src/error.rs

use thiserror::Error;

use crate::config::ConfigError;
use crate::frame::FrameError;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Dataset schema error: {0}")]
    Frame(#[from] FrameError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CleanerError>;
