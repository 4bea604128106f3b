//! Cross-sections of triangle meshes. A plane is intersected with every
//! triangle independently, producing one unordered segment per triangle it
//! passes through.

pub mod layers;
pub mod plane;
pub mod slicer;

pub use common::geometry::{Pos, Segment, Triangle};
pub use layers::{par_slice_layers, slice_layers, Layer, LayerPlan};
pub use plane::Plane;
pub use slicer::{
    par_slice_plane, par_slice_polygons_at, slice_plane, slice_polygons_at, slice_polygons_at_x,
    slice_polygons_at_y, slice_polygons_at_z, slice_triangle,
};
