//! Error types for loading tracks and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a track file.
#[derive(Debug, Error)]
pub enum TrackFileError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid track document.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A track needs at least two points to form a segment.
    #[error("track has {count} points, at least 2 are required")]
    TooFewPoints { count: usize },

    /// A coordinate is NaN or infinite.
    #[error("point #{index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },

    /// Line width must be positive.
    #[error("invalid line width: {0}")]
    InvalidLineWidth(f32),
}

/// Errors that can occur while loading the simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid configuration document.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}
