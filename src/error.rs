#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for rtc-stats-metrics operations
pub type Result<T> = std::result::Result<T, Error>;
