use thiserror::Error;

/// Unified error type for oracle-deck
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type OracleResult<T> = Result<T, OracleError>;
