use thiserror::Error;

use crate::tracker::TrackId;

/// Errors produced by the watchpost core.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Invalid zone: {0}")]
    InvalidZone(String),

    #[error("Track {0} observed more than once in a single frame")]
    DuplicateObservation(TrackId),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Frame {got} received after frame {last}; frames must arrive in increasing order")]
    FrameOutOfOrder { last: u64, got: u64 },

    #[error("Track {0} is not registered")]
    UnknownTrack(TrackId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for watchpost operations.
pub type Result<T> = std::result::Result<T, WatchError>;
