use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TrackFileError;
use crate::track::{DEFAULT_LINE_WIDTH, Track};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrackFile {
    #[serde(default)]
    pub metadata: TrackMetadata,
    pub points: Vec<[f32; 2]>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrackMetadata {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            name: default_name(),
            author: String::new(),
            line_width: default_line_width(),
        }
    }
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_line_width() -> f32 {
    DEFAULT_LINE_WIDTH
}

impl TrackFile {
    /// Load a track from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TrackFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| TrackFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| TrackFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a track from TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Check the file describes a usable track and build it.
    pub fn to_track(&self) -> Result<Track, TrackFileError> {
        if self.points.len() < 2 {
            return Err(TrackFileError::TooFewPoints {
                count: self.points.len(),
            });
        }
        if let Some(index) = self
            .points
            .iter()
            .position(|[x, y]| !x.is_finite() || !y.is_finite())
        {
            return Err(TrackFileError::NonFinitePoint { index });
        }
        let width = self.metadata.line_width;
        if !(width.is_finite() && width > 0.0) {
            return Err(TrackFileError::InvalidLineWidth(width));
        }
        Ok(Track::new(self.points_vec2(), width))
    }

    /// Get points as Vec2 (track coordinates, no transform needed).
    pub fn points_vec2(&self) -> Vec<Vec2> {
        self.points.iter().map(|&[x, y]| Vec2::new(x, y)).collect()
    }
}
