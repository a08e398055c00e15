//! Errors raised while encoding or decoding page and scorer messages.

#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse message: {0}")]
    Deserialize(serde_json::Error),

    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    /// A scorer answered with a score outside the 0-100 scale
    #[error("Score {0} outside 0..=100")]
    ScoreOutOfRange(f64),
}
