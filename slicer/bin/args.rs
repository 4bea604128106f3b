use std::{path::PathBuf, str::FromStr};

use anyhow::{ensure, Context, Ok, Result};
use clap::{Parser, ValueEnum};
use common::{config::SliceConfig, geometry::Axis};
use nalgebra::{ArrayStorage, Const, Matrix, Scalar, Vector4, U1};
use num_traits::Zero;
use slicer::Plane;

#[derive(Debug, Parser)]
/// Cut binary STL meshes with planes, printing the resulting segments.
pub struct Args {
    /// Path to a binary .stl file.
    pub mesh: PathBuf,

    #[arg(long)]
    /// TOML file with slice settings. Flags given on the command line take
    /// precedence over it.
    pub config: Option<PathBuf>,

    #[arg(long, value_parser = axis_value_parser)]
    /// Axis the slicing planes are perpendicular to (x, y or z).
    pub axis: Option<Axis>,
    #[arg(long, allow_negative_numbers = true)]
    /// Slice at this position along the axis. Can be given more than once.
    pub at: Vec<f32>,
    #[arg(long, allow_hyphen_values = true, value_parser = vector_value_parser::<f32, 4>, conflicts_with = "at")]
    /// Slice with the general plane `a, b, c, d` where ax + by + cz + d = 0.
    pub plane: Option<Vector4<f32>>,

    #[arg(long)]
    /// Distance between layers when scanning the whole mesh.
    pub layer_height: Option<f32>,
    #[arg(long)]
    /// Number of layers to scan. Defaults to enough to cover the mesh.
    pub layers: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    /// Position of the first layer. Defaults to half a layer above the
    /// lowest point of the mesh.
    pub start: Option<f32>,

    #[arg(long)]
    /// Reject meshes with data after the last triangle.
    pub strict: bool,
    #[arg(long)]
    /// Slice on all available threads.
    pub parallel: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long, short)]
    /// File to write the segments to, stdout if not given.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One segment per line, grouped by plane.
    Text,
    Json,
}

/// What the command line asked to be sliced.
pub enum Planes {
    Single(Plane),
    At(Vec<f32>),
    Layers,
}

impl Args {
    /// The config file (or defaults) with command line overrides applied.
    pub fn slice_config(&self) -> Result<SliceConfig> {
        let mut config = match &self.config {
            Some(path) => SliceConfig::load(path)?,
            None => SliceConfig::default(),
        };

        if let Some(axis) = self.axis {
            config.axis = axis;
        }
        if let Some(layer_height) = self.layer_height {
            config.layer_height = layer_height;
        }
        if self.layers.is_some() {
            config.layers = self.layers;
        }
        if self.start.is_some() {
            config.start = self.start;
        }
        config.parallel |= self.parallel;
        config.parse.strict_length |= self.strict;

        ensure!(
            config.layer_height > 0.0 && config.layer_height.is_finite(),
            "Layer height must be a positive number, got {}",
            config.layer_height
        );
        Ok(config)
    }

    pub fn planes(&self) -> Planes {
        if let Some(plane) = self.plane {
            Planes::Single(Plane::new(plane.x, plane.y, plane.z, plane.w))
        } else if !self.at.is_empty() {
            Planes::At(self.at.clone())
        } else {
            Planes::Layers
        }
    }
}

fn axis_value_parser(raw: &str) -> Result<Axis> {
    Axis::ALL
        .into_iter()
        .find(|axis| axis.name().eq_ignore_ascii_case(raw.trim()))
        .with_context(|| format!("Unknown axis `{raw}`, expected x, y or z"))
}

fn vector_value_parser<T, const N: usize>(
    raw: &str,
) -> Result<Matrix<T, Const<N>, U1, ArrayStorage<T, N, 1>>>
where
    T: FromStr + Scalar + Zero,
    T::Err: Send + Sync + std::error::Error + 'static,
{
    let mut vec = Matrix::<T, Const<N>, U1, ArrayStorage<T, N, 1>>::zeros();

    let mut parts = raw.splitn(N, ',');
    for i in 0..N {
        let element = parts.next().context("Missing vector element")?.trim();
        vec[i] = element
            .parse()
            .context("Can't convert element from string")?;
    }

    Ok(vec)
}
