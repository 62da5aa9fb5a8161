//! One simulation tick as a pure state transition.
//!
//! A tick moves the car with the heading it had at the end of the previous
//! tick, samples the sensors at the new pose when the cadence says so, and
//! finally lets the steering rule adjust the heading.

use bevy::prelude::*;
use tracing::debug;

use crate::config::SimConfig;
use crate::geometry::{RectCorners, corners_of_rotated_rectangle, velocity_from_heading_and_speed};
use crate::sensors::{
    SensorPositions, SensorReadings, SensorSampler, is_near_any_segment, sensor_positions,
};
use crate::steering::{Steering, SteeringController};
use crate::track::Track;

/// Position and heading of the car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarPose {
    pub position: Vec2,
    /// Degrees, 0 = +x, positive turns clockwise on screen.
    pub heading: f32,
}

/// Everything that changes from one tick to the next.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub pose: CarPose,
    pub readings: SensorReadings,
    pub steering: Steering,
    sampler: SensorSampler,
    /// Set on ticks where the sensors were sampled.
    pub sensors_refreshed: bool,
    pub tick: u64,
}

impl SimulationState {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pose: CarPose {
                position: config.car.start_position(),
                heading: config.car.start_heading,
            },
            readings: SensorReadings::default(),
            steering: Steering::from_config(&config.steering),
            sampler: SensorSampler::new(config.sensors.refresh_ticks),
            sensors_refreshed: false,
            tick: 0,
        }
    }

    /// Velocity the car will move with on the next tick.
    pub fn velocity(&self, config: &SimConfig) -> Vec2 {
        velocity_from_heading_and_speed(self.pose.heading, config.car.speed)
    }

    pub fn body(&self, config: &SimConfig) -> RectCorners {
        corners_of_rotated_rectangle(
            self.pose.position,
            config.car.width,
            config.car.height,
            self.pose.heading,
        )
    }

    pub fn sensors(&self, config: &SimConfig) -> SensorPositions {
        sensor_positions(
            self.pose.position,
            config.car.width,
            config.car.height,
            self.pose.heading,
        )
    }
}

/// Advance the simulation by one tick.
pub fn advance(mut state: SimulationState, track: &Track, config: &SimConfig) -> SimulationState {
    state.tick += 1;
    state.pose.position += state.velocity(config);

    state.sensors_refreshed = state.sampler.tick();
    if state.sensors_refreshed {
        let sensors = state.sensors(config);
        let readings = SensorReadings {
            left: is_near_any_segment(
                sensors.left,
                config.sensors.radius,
                track.points(),
                track.line_width(),
            ),
            right: is_near_any_segment(
                sensors.right,
                config.sensors.radius,
                track.points(),
                track.line_width(),
            ),
        };
        if readings != state.readings {
            debug!(
                tick = state.tick,
                left = readings.left,
                right = readings.right,
                "sensor contact changed"
            );
        }
        state.readings = readings;
    }

    state.pose.heading += state.steering.heading_change(state.readings);
    state
}

/// Totals collected by [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Ticks that ended with at least one sensor on the line.
    pub ticks_on_line: u64,
    pub sensor_refreshes: u64,
}

/// Advance `ticks` times without any input.
pub fn run(
    mut state: SimulationState,
    track: &Track,
    config: &SimConfig,
    ticks: u64,
) -> (SimulationState, RunSummary) {
    let mut summary = RunSummary::default();
    for _ in 0..ticks {
        state = advance(state, track, config);
        summary.ticks += 1;
        if state.readings.any() {
            summary.ticks_on_line += 1;
        }
        if state.sensors_refreshed {
            summary.sensor_refreshes += 1;
        }
    }
    (state, summary)
}
