//! Error type for the trajectory overlay.

use std::path::PathBuf;

use crate::config::ConfigKey;

/// Errors raised while loading the line asset or the persisted settings.
///
/// None of these reach the player. Line errors disable the overlay for the
/// session; config errors fall back to defaults.
#[derive(thiserror::Error, Debug)]
pub enum TrajectoryError {
    /// The line asset could not be read
    #[error("failed to read line asset {path:?}: {source}")]
    AssetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The line asset could not be parsed
    #[error("failed to parse line asset {path:?}: {message}")]
    AssetParse { path: PathBuf, message: String },

    /// A previous load failed; the line stays disabled for this session
    #[error("trajectory line is unavailable for this session")]
    LineUnavailable,

    /// Settings file IO error
    #[error("config IO error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Settings file parse error
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Settings serialization error
    #[error("config serialization error: {0}")]
    ConfigSerialize(String),

    /// A value of the wrong type was written to a key
    #[error("{key:?} expects a {expected} value")]
    ValueType { key: ConfigKey, expected: &'static str },
}

pub type Result<T, E = TrajectoryError> = std::result::Result<T, E>;
