use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown activity '{0}' for this location")]
    UnknownActivity(String),

    #[error("Unknown town: {0}")]
    UnknownTown(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Snapshot rejected: {0}")]
    Snapshot(String),

    #[error("Not enough meta points: need {needed}, have {available}")]
    InsufficientMeta { needed: u64, available: u64 },

    #[error("A task is still running")]
    TaskRunning,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Catalog parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
