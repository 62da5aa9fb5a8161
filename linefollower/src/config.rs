//! Tuning constants for the simulation and its window, loaded from TOML.
//!
//! Every field has a default so a config file only needs to name what it
//! changes:
//!
//! ```toml
//! [car]
//! speed = 2.0
//!
//! [steering]
//! kind = "bang_bang"
//! turn_rate_degrees = 1.5
//! ```

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::track::DEFAULT_LINE_WIDTH;

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SimConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub car: CarConfig,
    #[serde(default)]
    pub sensors: SensorConfig,
    #[serde(default)]
    pub steering: SteeringConfig,
    #[serde(default)]
    pub track: TrackConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default = "default_title")]
    pub title: String,
    /// Simulation ticks per second; rendering runs independently.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: f32,
}

impl WindowConfig {
    /// Length of one fixed simulation tick.
    pub fn tick_duration(&self) -> Result<Duration, ConfigError> {
        if !(self.ticks_per_second.is_finite() && self.ticks_per_second > 0.0) {
            return Err(ConfigError::invalid("window.ticks_per_second must be positive"));
        }
        Duration::try_from_secs_f32(1.0 / self.ticks_per_second).map_err(|_| {
            ConfigError::invalid(format!(
                "window.ticks_per_second = {} gives a tick that is too long",
                self.ticks_per_second
            ))
        })
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            title: default_title(),
            ticks_per_second: default_ticks_per_second(),
        }
    }
}

fn default_window_width() -> u32 {
    800
}

fn default_window_height() -> u32 {
    600
}

fn default_title() -> String {
    "Linienfolger-Visualisierung".to_string()
}

fn default_ticks_per_second() -> f32 {
    60.0
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CarConfig {
    /// Extent along the heading.
    pub width: f32,
    /// Extent across the heading.
    pub height: f32,
    pub start_x: f32,
    pub start_y: f32,
    /// Degrees, 0 = +x, positive turns clockwise on screen.
    pub start_heading: f32,
    /// Distance travelled per tick.
    pub speed: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 80.0,
            start_x: 0.0,
            start_y: 100.0,
            start_heading: 0.0,
            speed: 1.5,
        }
    }
}

impl CarConfig {
    pub fn start_position(&self) -> Vec2 {
        Vec2::new(self.start_x, self.start_y)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// Detection radius around each sensor point.
    pub radius: f32,
    /// Sensors are sampled once every this many ticks.
    pub refresh_ticks: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            radius: 18.0,
            refresh_ticks: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SteeringKind {
    #[default]
    TimeOffLine,
    BangBang,
    Pid,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SteeringConfig {
    pub kind: SteeringKind,
    /// Time-off-line growth per tick while exactly one sensor is on the line.
    pub step: f32,
    /// Upper bound of the time-off-line accumulator, and of the magnitude
    /// of the `pid` integral.
    pub max: f32,
    /// Heading change per tick is `time_off_line / divisor` degrees.
    pub divisor: f32,
    /// Fixed heading change per tick for `bang_bang`.
    pub turn_rate_degrees: f32,
    /// Gains for `pid`; the error is `right - left` per tick.
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            kind: SteeringKind::default(),
            step: 0.16,
            max: 3.0,
            divisor: 2.25,
            turn_rate_degrees: 1.0,
            kp: 0.5,
            ki: 0.9,
            kd: 0.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrackConfig {
    /// Used for the built-in track; track files carry their own width.
    pub line_width: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl SimConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid("window size must be non-zero"));
        }
        self.window.tick_duration()?;
        if self.sensors.refresh_ticks == 0 {
            return Err(ConfigError::invalid("sensors.refresh_ticks must be at least 1"));
        }
        if self.steering.divisor == 0.0 {
            return Err(ConfigError::invalid("steering.divisor must not be zero"));
        }

        let finite = [
            ("car.width", self.car.width),
            ("car.height", self.car.height),
            ("car.start_x", self.car.start_x),
            ("car.start_y", self.car.start_y),
            ("car.start_heading", self.car.start_heading),
            ("car.speed", self.car.speed),
            ("sensors.radius", self.sensors.radius),
            ("steering.step", self.steering.step),
            ("steering.max", self.steering.max),
            ("steering.divisor", self.steering.divisor),
            ("steering.turn_rate_degrees", self.steering.turn_rate_degrees),
            ("track.line_width", self.track.line_width),
            ("steering.kp", self.steering.kp),
            ("steering.ki", self.steering.ki),
            ("steering.kd", self.steering.kd),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::invalid(format!("{name} must be finite")));
        }

        if self.track.line_width <= 0.0 {
            return Err(ConfigError::invalid("track.line_width must be positive"));
        }
        let non_negative = [
            ("sensors.radius", self.sensors.radius),
            ("steering.step", self.steering.step),
            ("steering.max", self.steering.max),
        ];
        if let Some((name, _)) = non_negative.iter().find(|(_, value)| *value < 0.0) {
            return Err(ConfigError::invalid(format!("{name} must not be negative")));
        }
        Ok(())
    }
}
