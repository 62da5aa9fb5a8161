use bevy::prelude::*;

use crate::track::Track;

/// Input polled once per tick, already in track coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// `None` while the pointer is outside the window.
    pub pointer: Option<Vec2>,
    pub add_point_held: bool,
}

/// Turns the held state of the "add point" button into one append per press.
#[derive(Resource, Debug, Default)]
pub struct TrackEditor {
    add_point_was_held: bool,
}

impl TrackEditor {
    /// Apply one frame of input to `track`. Returns the appended point, if any.
    pub fn apply(&mut self, input: &FrameInput, track: &mut Track) -> Option<Vec2> {
        let rising_edge = input.add_point_held && !self.add_point_was_held;
        self.add_point_was_held = input.add_point_held;
        if !rising_edge {
            return None;
        }
        let point = input.pointer?;
        track.push(point);
        Some(point)
    }
}
