use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetadataError>;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Watch stream error: {0}")]
    WatchError(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Snapshot io error: {0}")]
    Io(#[from] std::io::Error),
}
