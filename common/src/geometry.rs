//! Plain value types shared between the mesh parser and the slicer.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub type Pos = Vector3<f32>;

/// One facet of a mesh. The vertex order `a -> b -> c` is expected to follow
/// the right-hand rule around `normal`, but nothing checks this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub normal: Pos,
    pub a: Pos,
    pub b: Pos,
    pub c: Pos,
}

/// A chord where a plane cuts through a single triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p: Pos,
    pub q: Pos,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Triangle {
    pub fn new(normal: Pos, a: Pos, b: Pos, c: Pos) -> Self {
        Self { normal, a, b, c }
    }

    pub fn vertices(&self) -> [Pos; 3] {
        [self.a, self.b, self.c]
    }

    /// The three directed edges, in the order `a -> b`, `b -> c`, `c -> a`.
    pub fn edges(&self) -> [(Pos, Pos); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }
}

impl Segment {
    pub fn new(p: Pos, q: Pos) -> Self {
        Self { p, q }
    }

    pub fn endpoints(&self) -> [Pos; 2] {
        [self.p, self.q]
    }
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of this axis into a [`Pos`].
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Get the minimum and maximum of each component of every vertex.
/// These points define the bounding box of the triangles.
pub fn triangle_bounds(triangles: &[Triangle]) -> (Pos, Pos) {
    triangles.iter().flat_map(Triangle::vertices).fold(
        (
            Pos::new(f32::MAX, f32::MAX, f32::MAX),
            Pos::new(f32::MIN, f32::MIN, f32::MIN),
        ),
        |(min, max), v| {
            (
                Pos::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z)),
                Pos::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z)),
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_vertex_order() {
        let tri = Triangle::new(
            Pos::z(),
            Pos::new(0.0, 0.0, 0.0),
            Pos::new(1.0, 0.0, 0.0),
            Pos::new(0.0, 1.0, 0.0),
        );

        let [ab, bc, ca] = tri.edges();
        assert_eq!(ab, (tri.a, tri.b));
        assert_eq!(bc, (tri.b, tri.c));
        assert_eq!(ca, (tri.c, tri.a));
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let triangles = [
            Triangle::new(
                Pos::zeros(),
                Pos::new(-1.0, 2.0, 0.5),
                Pos::new(3.0, 0.0, 0.0),
                Pos::new(0.0, 0.0, 4.0),
            ),
            Triangle::new(
                Pos::zeros(),
                Pos::new(0.0, -2.0, 0.0),
                Pos::new(0.0, 0.0, -1.0),
                Pos::new(0.0, 0.0, 0.0),
            ),
        ];

        let (min, max) = triangle_bounds(&triangles);
        assert_eq!(min, Pos::new(-1.0, -2.0, -1.0));
        assert_eq!(max, Pos::new(3.0, 2.0, 4.0));
    }

    #[test]
    fn axis_index_matches_component() {
        let pos = Pos::new(1.0, 2.0, 3.0);
        let picked = Axis::ALL.map(|axis| pos[axis.index()]);
        assert_eq!(picked, [1.0, 2.0, 3.0]);
    }
}
