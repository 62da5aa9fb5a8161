use bevy::prelude::*;

use crate::geometry::segment_displaced_polygon;

/// Rendered thickness of the track line when nothing else is configured.
pub const DEFAULT_LINE_WIDTH: f32 = 18.0;

/// One lap of the built-in course, in screen coordinates.
const DEFAULT_LAP: [Vec2; 23] = [
    Vec2::new(116.0, 68.0),
    Vec2::new(317.0, 82.0),
    Vec2::new(368.0, 29.0),
    Vec2::new(454.0, 8.0),
    Vec2::new(598.0, 35.0),
    Vec2::new(653.0, 77.0),
    Vec2::new(700.0, 158.0),
    Vec2::new(694.0, 236.0),
    Vec2::new(659.0, 275.0),
    Vec2::new(562.0, 317.0),
    Vec2::new(487.0, 320.0),
    Vec2::new(497.0, 388.0),
    Vec2::new(440.0, 386.0),
    Vec2::new(383.0, 433.0),
    Vec2::new(421.0, 514.0),
    Vec2::new(368.0, 553.0),
    Vec2::new(233.0, 527.0),
    Vec2::new(220.0, 383.0),
    Vec2::new(169.0, 311.0),
    Vec2::new(58.0, 256.0),
    Vec2::new(40.0, 170.0),
    Vec2::new(59.0, 91.0),
    Vec2::new(115.0, 68.0),
];

/// The built-in course is the lap above laid down four times in a row.
const DEFAULT_LAP_REPEATS: usize = 4;

/// An ordered polyline the car follows. Consecutive points form segments.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<Vec2>,
    line_width: f32,
}

impl Default for Track {
    fn default() -> Self {
        Self::new(
            DEFAULT_LAP
                .iter()
                .copied()
                .cycle()
                .take(DEFAULT_LAP.len() * DEFAULT_LAP_REPEATS)
                .collect(),
            DEFAULT_LINE_WIDTH,
        )
    }
}

impl Track {
    pub fn new(points: Vec<Vec2>, line_width: f32) -> Self {
        Self { points, line_width }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    /// Every `(start, end)` pair of consecutive points. Empty for fewer than 2 points.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Append a point at the end of the polyline.
    pub fn push(&mut self, point: Vec2) {
        self.points.push(point);
    }

    /// The track as `(x, y),` lines, ready to paste back into a point list.
    pub fn export_lines(&self) -> String {
        let mut out = String::new();
        for point in &self.points {
            out.push_str(&format!(
                "({}, {}),\n",
                format_coordinate(point.x),
                format_coordinate(point.y)
            ));
        }
        out
    }
}

fn format_coordinate(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Triangle mesh of the whole track, one quad per segment.
///
/// `to_world` maps track coordinates into the render space.
pub fn create_track_mesh(track: &Track, to_world: impl Fn(Vec2) -> Vec2) -> Mesh {
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for (start, end) in track.segments() {
        push_segment_quad(
            &mut positions,
            &mut indices,
            segment_displaced_polygon(start, end, track.line_width()),
            &to_world,
        );
    }
    triangle_mesh(positions, indices)
}

/// Single quad of `width` from `start` to `end`, drawn like one track segment.
pub fn create_segment_mesh(
    start: Vec2,
    end: Vec2,
    width: f32,
    to_world: impl Fn(Vec2) -> Vec2,
) -> Mesh {
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    push_segment_quad(
        &mut positions,
        &mut indices,
        segment_displaced_polygon(start, end, width),
        &to_world,
    );
    triangle_mesh(positions, indices)
}

fn push_segment_quad(
    positions: &mut Vec<[f32; 3]>,
    indices: &mut Vec<u32>,
    quad: [Vec2; 4],
    to_world: &impl Fn(Vec2) -> Vec2,
) {
    let base = positions.len() as u32;
    for corner in quad {
        let p = to_world(corner);
        positions.push([p.x, p.y, 0.0]);
    }

    // Two triangles per segment
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

fn triangle_mesh(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Mesh {
    let mut mesh = Mesh::new(
        bevy::mesh::PrimitiveTopology::TriangleList,
        bevy::asset::RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_indices(bevy::mesh::Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_track_repeats_the_lap_four_times() {
        let track = Track::default();
        assert_eq!(track.len(), 92);
        assert_eq!(track.points()[0], Vec2::new(116.0, 68.0));
        assert_eq!(track.points()[22], Vec2::new(115.0, 68.0));
        assert_eq!(track.points()[23], Vec2::new(116.0, 68.0));
        assert_eq!(&track.points()[..23], &track.points()[69..]);
        assert_eq!(track.line_width(), DEFAULT_LINE_WIDTH);
    }

    #[test]
    fn segments_pair_consecutive_points() {
        let track = Track::new(
            vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)],
            2.0,
        );
        let segments: Vec<_> = track.segments().collect();
        assert_eq!(
            segments,
            vec![
                (Vec2::ZERO, Vec2::new(1.0, 0.0)),
                (Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)),
            ]
        );
    }

    #[test]
    fn short_tracks_have_no_segments() {
        assert_eq!(Track::new(Vec::new(), 2.0).segments().count(), 0);
        assert_eq!(Track::new(vec![Vec2::ONE], 2.0).segments().count(), 0);
    }

    #[test]
    fn push_appends_in_order() {
        let mut track = Track::new(vec![Vec2::ZERO], 2.0);
        track.push(Vec2::new(5.0, 6.0));
        track.push(Vec2::new(5.0, 6.0));
        assert_eq!(track.len(), 3);
        assert_eq!(track.last(), Some(Vec2::new(5.0, 6.0)));
        assert_eq!(track.segments().count(), 2);
    }

    #[test]
    fn export_prints_one_tuple_per_line() {
        let track = Track::new(vec![Vec2::new(116.0, 68.0), Vec2::new(12.5, -3.0)], 2.0);
        assert_eq!(track.export_lines(), "(116, 68),\n(12.5, -3),\n");
        assert_eq!(Track::new(Vec::new(), 2.0).export_lines(), "");
    }

    #[test]
    fn track_mesh_has_a_quad_per_segment() {
        let track = Track::new(
            vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)],
            4.0,
        );
        let mesh = create_track_mesh(&track, |p| p);
        assert_eq!(mesh.count_vertices(), 8);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(12));
    }

    #[test]
    fn segment_mesh_spans_the_line_width() {
        let mesh = create_segment_mesh(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, |p| {
            Vec2::new(p.x, -p.y)
        });
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|values| values.as_float3())
            .unwrap();
        assert_eq!(
            positions,
            &[
                [0.0, 2.0, 0.0],
                [10.0, 2.0, 0.0],
                [10.0, -2.0, 0.0],
                [0.0, -2.0, 0.0],
            ]
        );
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
    }
}
