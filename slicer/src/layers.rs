//! Scanning a mesh with evenly spaced parallel planes.

use common::{
    config::SliceConfig,
    geometry::{Axis, Pos, Segment, Triangle},
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;
use tracing::debug;

use crate::{plane::Plane, slicer::slice_plane};

/// The segments cut by one plane of a [`LayerPlan`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub index: u32,
    /// Position of the plane along the plan's axis.
    pub height: f32,
    pub plane: Plane,
    pub segments: Vec<Segment>,
}

/// `count` planes perpendicular to `axis`, at `start + i * step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPlan {
    pub axis: Axis,
    pub start: f32,
    pub step: f32,
    pub count: u32,
}

impl LayerPlan {
    pub fn new(axis: Axis, start: f32, step: f32, count: u32) -> Self {
        Self {
            axis,
            start,
            step,
            count,
        }
    }

    /// Plans layers through the middle of each `step` sized band between the
    /// lower and upper bound along `axis`, so no plane sits exactly on the
    /// outer faces of the box.
    pub fn covering(bounds: (Pos, Pos), axis: Axis, step: f32) -> Self {
        let (min, max) = (bounds.0[axis.index()], bounds.1[axis.index()]);
        Self::new(axis, min + step / 2.0, step, band_count(min, max, step))
    }

    /// Builds a plan from a config, falling back to [`LayerPlan::covering`]
    /// for whatever the config leaves unset.
    pub fn from_config(config: &SliceConfig, bounds: (Pos, Pos)) -> Self {
        let covering = Self::covering(bounds, config.axis, config.layer_height);
        let Some(start) = config.start else {
            return Self {
                count: config.layers.unwrap_or(covering.count),
                ..covering
            };
        };

        let max = bounds.1[config.axis.index()];
        let count = config
            .layers
            .unwrap_or_else(|| band_count(start, max, config.layer_height));
        Self::new(config.axis, start, config.layer_height, count)
    }

    pub fn height(&self, index: u32) -> f32 {
        self.start + index as f32 * self.step
    }

    pub fn plane(&self, index: u32) -> Plane {
        Plane::axis_aligned(self.axis, self.height(index))
    }

    fn layer(&self, triangles: &[Triangle], index: u32) -> Layer {
        let plane = self.plane(index);
        Layer {
            index,
            height: self.height(index),
            plane,
            segments: slice_plane(triangles, &plane),
        }
    }
}

/// Slices every layer of `plan` in order.
pub fn slice_layers(triangles: &[Triangle], plan: &LayerPlan) -> Vec<Layer> {
    debug!("Slicing {} layers along {}", plan.count, plan.axis.name());
    (0..plan.count)
        .map(|index| plan.layer(triangles, index))
        .collect()
}

/// Slices the layers of `plan` across threads. Layers are returned in
/// ascending order, identical to [`slice_layers`].
pub fn par_slice_layers(triangles: &[Triangle], plan: &LayerPlan) -> Vec<Layer> {
    debug!(
        "Slicing {} layers along {} in parallel",
        plan.count,
        plan.axis.name()
    );
    (0..plan.count)
        .into_par_iter()
        .map(|index| plan.layer(triangles, index))
        .collect()
}

fn band_count(min: f32, max: f32, step: f32) -> u32 {
    let span = max - min;
    let usable = step > 0.0 && span > 0.0 && span.is_finite();
    if !usable {
        return 0;
    }

    (span / step).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wedge() -> Vec<Triangle> {
        vec![Triangle::new(
            Pos::zeros(),
            Pos::new(0.0, 0.0, 0.0),
            Pos::new(4.0, 0.0, 4.0),
            Pos::new(0.0, 4.0, 4.0),
        )]
    }

    #[test]
    fn covering_plan() {
        let plan = LayerPlan::covering((Pos::zeros(), Pos::new(1.0, 2.0, 4.0)), Axis::Z, 1.0);
        assert_eq!(plan.count, 4);
        assert_eq!(plan.start, 0.5);
        assert_eq!(
            (0..plan.count).map(|i| plan.height(i)).collect::<Vec<_>>(),
            vec![0.5, 1.5, 2.5, 3.5]
        );

        let plan = LayerPlan::covering((Pos::zeros(), Pos::new(1.0, 2.0, 4.0)), Axis::Y, 0.3);
        assert_eq!(plan.count, 7);
    }

    #[test]
    fn degenerate_plans_are_empty() {
        let bounds = (Pos::zeros(), Pos::new(1.0, 1.0, 1.0));
        assert_eq!(LayerPlan::covering(bounds, Axis::Z, 0.0).count, 0);
        assert_eq!(LayerPlan::covering(bounds, Axis::Z, -1.0).count, 0);
        assert_eq!(LayerPlan::covering(bounds, Axis::Z, f32::NAN).count, 0);

        let inverted = (Pos::repeat(f32::MAX), Pos::repeat(f32::MIN));
        assert_eq!(LayerPlan::covering(inverted, Axis::X, 1.0).count, 0);
    }

    #[test]
    fn plan_from_config() {
        let bounds = (Pos::zeros(), Pos::new(10.0, 10.0, 10.0));

        let config = SliceConfig {
            layer_height: 2.0,
            ..Default::default()
        };
        let plan = LayerPlan::from_config(&config, bounds);
        assert_eq!((plan.start, plan.count), (1.0, 5));

        let config = SliceConfig {
            axis: Axis::X,
            layer_height: 2.0,
            start: Some(4.0),
            ..Default::default()
        };
        let plan = LayerPlan::from_config(&config, bounds);
        assert_eq!((plan.axis, plan.start, plan.count), (Axis::X, 4.0, 3));

        let config = SliceConfig {
            layer_height: 0.5,
            layers: Some(2),
            ..Default::default()
        };
        let plan = LayerPlan::from_config(&config, bounds);
        assert_eq!((plan.start, plan.count), (0.25, 2));
    }

    #[test]
    fn layers_are_ordered() {
        let triangles = wedge();
        let plan = LayerPlan::new(Axis::Z, 0.5, 1.0, 4);

        let layers = slice_layers(&triangles, &plan);
        assert_eq!(layers.len(), 4);
        for (i, layer) in layers.iter().enumerate() {
            assert_eq!(layer.index, i as u32);
            assert_eq!(layer.height, 0.5 + i as f32);
            assert_eq!(layer.plane, Plane::at_z(layer.height));
            assert_eq!(layer.segments.len(), 1);
            for point in layer.segments[0].endpoints() {
                assert_eq!(point.z, layer.height);
            }
        }

        assert_eq!(par_slice_layers(&triangles, &plan), layers);
    }

    #[test]
    fn layers_outside_mesh_are_empty() {
        let plan = LayerPlan::new(Axis::Z, 5.0, 1.0, 3);
        let layers = slice_layers(&wedge(), &plan);
        assert!(layers.iter().all(|layer| layer.segments.is_empty()));
    }
}
