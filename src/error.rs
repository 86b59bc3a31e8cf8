use thiserror::Error;

/// Errors raised by the relationship-boost engine.
///
/// Missing historical data is never an error: absent caches and absent
/// records degrade to zero boosts. Only data that is present but malformed
/// ends up here.
#[derive(Debug, Error)]
pub enum BoostError {
    /// A cache record was found but its fields cannot be trusted.
    #[error("corrupt cache record {key:?}: field `{field}` {detail}")]
    CacheCorruption {
        key: String,
        field: &'static str,
        detail: String,
    },

    #[error("invalid stat line: {0}")]
    InvalidStatLine(String),

    #[error("invalid runner {runner:?}: {detail}")]
    InvalidRunner { runner: String, detail: String },

    #[error("invalid track weights for {track:?}: {detail}")]
    InvalidTrackWeights { track: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoostError>;
