//! Plane / triangle intersection.
//!
//! Every triangle is cut independently of the others, so a plane through a
//! mesh yields an unordered soup of segments, at most one per triangle. The
//! segments are never joined into polygons.

use std::ops::Range;

use common::geometry::{Pos, Segment, Triangle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::trace;

use crate::plane::Plane;

/// An edge crosses the plane when its intersection parameter lies in this
/// half-open range. Including the start and excluding the end attributes a
/// vertex lying on the plane to exactly one of the two edges meeting there.
const CROSSING: Range<f32> = 0.0..1.0;

/// Edge pairs checked for a crossing, in order of priority. Indices are into
/// `[p -> q, q -> r, r -> p]`.
const EDGE_PAIRS: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

/// Slices triangles with the plane `a·x + b·y + c·z + d = 0`.
pub fn slice_polygons_at(triangles: &[Triangle], a: f32, b: f32, c: f32, d: f32) -> Vec<Segment> {
    slice_plane(triangles, &Plane::new(a, b, c, d))
}

/// Slices triangles with the plane perpendicular to the x axis at `x`.
pub fn slice_polygons_at_x(triangles: &[Triangle], x: f32) -> Vec<Segment> {
    slice_polygons_at(triangles, 1.0, 0.0, 0.0, -x)
}

/// Slices triangles with the plane perpendicular to the y axis at `y`.
pub fn slice_polygons_at_y(triangles: &[Triangle], y: f32) -> Vec<Segment> {
    slice_polygons_at(triangles, 0.0, 1.0, 0.0, -y)
}

/// Slices triangles with the plane perpendicular to the z axis at `z`.
pub fn slice_polygons_at_z(triangles: &[Triangle], z: f32) -> Vec<Segment> {
    slice_polygons_at(triangles, 0.0, 0.0, 1.0, -z)
}

/// Parallel version of [`slice_polygons_at`]. The result is identical,
/// segments stay in triangle order.
pub fn par_slice_polygons_at(
    triangles: &[Triangle],
    a: f32,
    b: f32,
    c: f32,
    d: f32,
) -> Vec<Segment> {
    par_slice_plane(triangles, &Plane::new(a, b, c, d))
}

pub fn slice_plane(triangles: &[Triangle], plane: &Plane) -> Vec<Segment> {
    let segments = triangles
        .iter()
        .filter_map(|triangle| slice_triangle(triangle, plane))
        .collect::<Vec<_>>();

    trace!(
        "{} of {} triangles cut by {plane}",
        segments.len(),
        triangles.len()
    );
    segments
}

pub fn par_slice_plane(triangles: &[Triangle], plane: &Plane) -> Vec<Segment> {
    triangles
        .par_iter()
        .filter_map(|triangle| slice_triangle(triangle, plane))
        .collect()
}

/// Finds the chord where `plane` cuts through `triangle`, if any.
///
/// Triangles lying in the plane produce nothing, as do triangles that only
/// touch it at a single vertex.
pub fn slice_triangle(triangle: &Triangle, plane: &Plane) -> Option<Segment> {
    let Triangle { a: p, b: q, c: r, .. } = *triangle;

    let edges = [(p, q), (q, r), (r, p)];
    let t = edges.map(|(start, end)| segment_plane_intersection(&start, &end, plane));
    let crosses = t.map(|t| CROSSING.contains(&t));

    let (first, second) = EDGE_PAIRS
        .into_iter()
        .find(|&(i, j)| crosses[i] && crosses[j])?;

    Some(Segment::new(
        point_on_line(&edges[first].0, &edges[first].1, t[first]),
        point_on_line(&edges[second].0, &edges[second].1, t[second]),
    ))
}

/// Parameter `t` of the point `(1 - t)·start + t·end` where the line through
/// `start` and `end` meets the plane. An edge parallel to the plane gives an
/// infinite or NaN value.
pub fn segment_plane_intersection(start: &Pos, end: &Pos, plane: &Plane) -> f32 {
    let Plane { a, b, c, .. } = *plane;
    -plane.eval(start)
        / (a * (end.x - start.x) + b * (end.y - start.y) + c * (end.z - start.z))
}

/// The point dividing `start -> end` in the ratio `t : 1 - t`.
pub fn point_on_line(start: &Pos, end: &Pos, t: f32) -> Pos {
    start * (1.0 - t) + end * t
}
