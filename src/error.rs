use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoinerError {
    #[error("No joinable columns found")]
    NoJoinableColumns,

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JoinerError>;
