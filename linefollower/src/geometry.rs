//! Closed-form 2D helpers shared by the simulation and the renderer.
//!
//! All coordinates are screen-style: x grows to the right, y grows downwards.
//! Angles are in degrees unless a name says otherwise, and a positive heading
//! change turns clockwise on screen.

use bevy::math::Vec2;

/// The four corners of a rotated rectangle, named from the point of view of a
/// body facing along the rotation angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectCorners {
    pub front_right: Vec2,
    pub front_left: Vec2,
    pub back_left: Vec2,
    pub back_right: Vec2,
}

impl RectCorners {
    /// Corners in drawing order: front-right, front-left, back-left, back-right.
    pub fn points(&self) -> [Vec2; 4] {
        [
            self.front_right,
            self.front_left,
            self.back_left,
            self.back_right,
        ]
    }
}

/// Corners of a `width` x `height` rectangle centred at `center`, rotated by
/// `rotation_degrees`. `width` runs along the facing direction.
pub fn corners_of_rotated_rectangle(
    center: Vec2,
    width: f32,
    height: f32,
    rotation_degrees: f32,
) -> RectCorners {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    // Every corner sits on the circle through the diagonal.
    let radius = (half_w * half_w + half_h * half_h).sqrt();
    let corner_angle = half_h.atan2(half_w);
    let rotation = rotation_degrees.to_radians();

    let corner = |angle: f32| center + Vec2::from_angle(angle + rotation) * radius;

    RectCorners {
        front_right: corner(corner_angle),
        front_left: corner(-corner_angle),
        back_left: corner(std::f32::consts::PI + corner_angle),
        back_right: corner(std::f32::consts::PI - corner_angle),
    }
}

/// Shortest distance from `point` to the segment `seg_start`..`seg_end`.
pub fn distance_point_to_segment(point: Vec2, seg_start: Vec2, seg_end: Vec2) -> f32 {
    let ab = seg_end - seg_start;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(seg_start);
    }
    let t = ((point - seg_start).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(seg_start + ab * t)
}

/// Quad covering a line of thickness `width` from `start` to `end`.
///
/// Order: start and end on the left edge, then end and start on the right edge,
/// so the result can be triangulated as `(0, 1, 2), (0, 2, 3)`. A zero-length
/// segment has no direction and collapses to four copies of `start`.
pub fn segment_displaced_polygon(start: Vec2, end: Vec2, width: f32) -> [Vec2; 4] {
    let direction = (end - start).normalize_or_zero();
    let offset = direction.perp() * (width / 2.0);
    [start - offset, end - offset, end + offset, start + offset]
}

/// Velocity vector for a body moving at `speed` along `heading_degrees`.
///
/// Heading 0 points along +x, heading 90 along +y (down the screen).
pub fn velocity_from_heading_and_speed(heading_degrees: f32, speed: f32) -> Vec2 {
    Vec2::from_angle(heading_degrees.to_radians()) * speed
}
