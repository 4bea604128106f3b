use std::{
    env,
    fs::File,
    io::{stdout, BufWriter, Write},
    time::Instant,
};

use anyhow::{bail, Context, Result};
use args::{Args, OutputFormat, Planes};
use clap::Parser;
use serde::Serialize;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, util::SubscriberInitExt};

use common::config::SliceConfig;
use mesh_format::Mesh;
use slicer::{
    par_slice_layers, par_slice_plane, slice_layers, slice_plane, LayerPlan, Plane, Segment,
};

mod args;

/// The segments cut by one plane, as written to the output.
#[derive(Serialize)]
struct Section {
    plane: Plane,
    segments: Vec<Segment>,
}

fn main() -> Result<()> {
    let format = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(log_filter(env::var("RUST_LOG").ok().as_deref()))
        .with(format)
        .init();

    let args = Args::parse();
    let config = args.slice_config()?;

    let mesh = Mesh::open(&args.mesh, &config.parse);
    if !mesh.is_valid() {
        bail!("No mesh data available from `{}`", args.mesh.display());
    }

    info!(
        "Loaded `{}`. {{ triangles: {} }}",
        args.mesh.display(),
        mesh.len()
    );
    if mesh.is_empty() {
        warn!("Mesh has no triangles, every slice will be empty");
    }

    let now = Instant::now();
    let sections = slice(&mesh, &config, args.planes());
    let segment_count = sections.iter().map(|x| x.segments.len()).sum::<usize>();
    info!(
        "Cut {} segments over {} planes in {:.1}ms",
        segment_count,
        sections.len(),
        now.elapsed().as_secs_f32() * 1000.0
    );

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file `{}`", path.display())
        })?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    };

    match args.format {
        OutputFormat::Text => write_text(&mut out, &sections)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &sections)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(())
}

/// Uses the `RUST_LOG` directives when they parse, `info` for this
/// workspace and `warn` for everything else otherwise.
fn log_filter(directives: Option<&str>) -> Targets {
    if let Some(directives) = directives {
        match directives.parse() {
            Ok(targets) => return targets,
            Err(err) => eprintln!("Ignoring invalid RUST_LOG `{directives}`: {err}"),
        }
    }

    Targets::new()
        .with_default(LevelFilter::WARN)
        .with_target("slicer", LevelFilter::INFO)
        .with_target("mesh_format", LevelFilter::INFO)
        .with_target("common", LevelFilter::INFO)
}

fn slice(mesh: &Mesh, config: &SliceConfig, planes: Planes) -> Vec<Section> {
    let triangles = mesh.triangles();
    let cut = |plane: Plane| Section {
        plane,
        segments: if config.parallel {
            par_slice_plane(triangles, &plane)
        } else {
            slice_plane(triangles, &plane)
        },
    };

    match planes {
        Planes::Single(plane) => vec![cut(plane)],
        Planes::At(values) => values
            .into_iter()
            .map(|value| cut(Plane::axis_aligned(config.axis, value)))
            .collect(),
        Planes::Layers => {
            let plan = LayerPlan::from_config(config, mesh.bounds());
            let layers = if config.parallel {
                par_slice_layers(triangles, &plan)
            } else {
                slice_layers(triangles, &plan)
            };

            layers
                .into_iter()
                .map(|layer| Section {
                    plane: layer.plane,
                    segments: layer.segments,
                })
                .collect()
        }
    }
}

fn write_text(out: &mut impl Write, sections: &[Section]) -> Result<()> {
    for section in sections {
        writeln!(
            out,
            "# {} ({} segments)",
            section.plane,
            section.segments.len()
        )?;
        for Segment { p, q } in &section.segments {
            writeln!(out, "{} {} {} {} {} {}", p.x, p.y, p.z, q.x, q.y, q.z)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn default_log_filter() {
        for filter in [log_filter(None), log_filter(Some("not a level=?"))] {
            assert!(filter.would_enable("mesh_format::stl", &Level::INFO));
            assert!(!filter.would_enable("mesh_format::stl", &Level::DEBUG));
            assert!(!filter.would_enable("rayon", &Level::INFO));
            assert!(filter.would_enable("rayon", &Level::WARN));
        }
    }

    #[test]
    fn rust_log_overrides_default() {
        let filter = log_filter(Some("warn,mesh_format=debug"));
        assert!(filter.would_enable("mesh_format::stl", &Level::DEBUG));
        assert!(!filter.would_enable("slicer", &Level::INFO));
    }
}
