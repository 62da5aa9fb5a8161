use bevy::math::Vec2;

use crate::geometry::{corners_of_rotated_rectangle, distance_point_to_segment};

/// True if a sensor disc of `radius` at `point` overlaps any segment of the
/// polyline `points` drawn `line_width` thick.
pub fn is_near_any_segment(point: Vec2, radius: f32, points: &[Vec2], line_width: f32) -> bool {
    let reach = radius + line_width / 2.0;
    points
        .windows(2)
        .any(|pair| distance_point_to_segment(point, pair[0], pair[1]) < reach)
}

/// World positions of the two sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorPositions {
    pub left: Vec2,
    pub right: Vec2,
}

/// The sensors sit on the front corners of the car body.
pub fn sensor_positions(center: Vec2, width: f32, height: f32, heading: f32) -> SensorPositions {
    let corners = corners_of_rotated_rectangle(center, width, height, heading);
    SensorPositions {
        left: corners.front_left,
        right: corners.front_right,
    }
}

/// Line contact of each sensor as of its last refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorReadings {
    pub left: bool,
    pub right: bool,
}

impl SensorReadings {
    pub fn exactly_one(&self) -> bool {
        self.left != self.right
    }

    pub fn any(&self) -> bool {
        self.left || self.right
    }
}

/// Counts ticks down to the next sensor refresh.
///
/// The first refresh is due on tick `refresh_ticks`, then every
/// `refresh_ticks` ticks after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSampler {
    refresh_ticks: u32,
    ticks_left: u32,
}

impl SensorSampler {
    /// `refresh_ticks` of 0 is treated as 1.
    pub fn new(refresh_ticks: u32) -> Self {
        let refresh_ticks = refresh_ticks.max(1);
        Self {
            refresh_ticks,
            ticks_left: refresh_ticks,
        }
    }

    /// Advance one tick. Returns true if the sensors must be sampled now.
    pub fn tick(&mut self) -> bool {
        self.ticks_left -= 1;
        if self.ticks_left == 0 {
            self.ticks_left = self.refresh_ticks;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use bevy::math::vec2;

    use super::*;

    fn straight() -> Vec<Vec2> {
        vec![vec2(0.0, 0.0), vec2(100.0, 0.0)]
    }

    #[test]
    fn sensor_close_to_line_is_near() {
        assert!(is_near_any_segment(vec2(50.0, 3.0), 5.0, &straight(), 10.0));
    }

    #[test]
    fn sensor_far_from_line_is_not_near() {
        assert!(!is_near_any_segment(vec2(50.0, 20.0), 5.0, &straight(), 10.0));
    }

    #[test]
    fn reach_boundary_is_exclusive() {
        assert!(!is_near_any_segment(vec2(50.0, 10.0), 5.0, &straight(), 10.0));
        assert!(is_near_any_segment(vec2(50.0, 9.9), 5.0, &straight(), 10.0));
    }

    #[test]
    fn short_tracks_are_never_near() {
        for point in [Vec2::ZERO, vec2(1.0, 1.0), vec2(-500.0, 42.0)] {
            assert!(!is_near_any_segment(point, 1000.0, &[], 10.0));
            assert!(!is_near_any_segment(point, 1000.0, &[Vec2::ZERO], 10.0));
        }
    }

    #[test]
    fn any_segment_counts() {
        let points = [vec2(0.0, 0.0), vec2(100.0, 0.0), vec2(100.0, 100.0)];
        assert!(is_near_any_segment(vec2(104.0, 60.0), 2.0, &points, 4.0));
        assert!(!is_near_any_segment(vec2(50.0, 50.0), 2.0, &points, 4.0));
    }

    #[test]
    fn sensors_sit_on_front_corners() {
        let sensors = sensor_positions(vec2(0.0, 100.0), 120.0, 80.0, 0.0);
        assert_abs_diff_eq!(sensors.left.x, 60.0, epsilon = 1e-4);
        assert_abs_diff_eq!(sensors.left.y, 60.0, epsilon = 1e-4);
        assert_abs_diff_eq!(sensors.right.x, 60.0, epsilon = 1e-4);
        assert_abs_diff_eq!(sensors.right.y, 140.0, epsilon = 1e-4);
    }

    #[test]
    fn readings_classify_contact() {
        let none = SensorReadings::default();
        let left = SensorReadings {
            left: true,
            right: false,
        };
        let both = SensorReadings {
            left: true,
            right: true,
        };
        assert!(!none.exactly_one() && !none.any());
        assert!(left.exactly_one() && left.any());
        assert!(!both.exactly_one() && both.any());
    }

    #[test]
    fn sampler_fires_every_n_ticks() {
        let mut sampler = SensorSampler::new(5);
        let fired: Vec<bool> = (0..12).map(|_| sampler.tick()).collect();
        assert_eq!(
            fired,
            [
                false, false, false, false, true, false, false, false, false, true, false, false
            ]
        );
    }

    #[test]
    fn sampler_with_cadence_one_fires_every_tick() {
        let mut sampler = SensorSampler::new(1);
        assert!((0..4).all(|_| sampler.tick()));
        let mut sampler = SensorSampler::new(0);
        assert!(sampler.tick());
    }
}
