//! Command line front end: JSON rectangles in, adjusted JSON rectangles out.
//!
//! Options come from an optional JSON file (the [`AdjustOptions`] serde shape) and are
//! then overridden by flags.

use crate::diagnostics::FrameRecorder;
use crate::{
    AdjustOptions, Adjustment, ForceSimulator, HilbertRTree, MarginType, QuadTree, RectangleSet,
    SpatialIndex,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Command line arguments of the `labeladjust` binary
#[derive(Parser, Debug)]
#[command(name = "labeladjust", version, about = "Push overlapping label boxes apart")]
pub struct Args {
    /// Input JSON array of {x, y, width, height}, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Options JSON file; flags below override its values
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Step multiplier (default: half the mean width)
    #[arg(long)]
    pub speed: Option<f64>,

    /// Disable the size-based sphere test
    #[arg(long = "no-size-repulsion")]
    pub no_size_repulsion: bool,

    /// Collision sphere scale
    #[arg(long = "radius-scale")]
    pub radius_scale: Option<f64>,

    /// Number of simulation rounds
    #[arg(short = 'n', long = "max-iterations")]
    pub max_iterations: Option<usize>,

    /// Margin around each rectangle
    #[arg(short = 'm', long)]
    pub margin: Option<f64>,

    /// Margin interpretation: percentage or absolute
    #[arg(long = "margin-type")]
    pub margin_type: Option<String>,

    /// Seed for the jitter generator
    #[arg(short = 's', long)]
    pub seed: Option<u64>,

    /// Spatial index leaf capacity
    #[arg(long = "max-items")]
    pub max_items: Option<usize>,

    /// Spatial index depth limit
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,

    /// Spatial index backend
    #[arg(long, value_enum, default_value = "quadtree")]
    pub index: IndexBackend,

    /// Write every intermediate layout to this JSON file
    #[arg(long)]
    pub snapshots: Option<PathBuf>,

    /// Write SVG frames of the candidate queries into this directory
    #[arg(long)]
    pub frames: Option<PathBuf>,

    /// Maximum number of SVG frames
    #[arg(long = "max-frames", default_value_t = 500)]
    pub max_frames: usize,

    /// Do not print the run summary to stderr
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Spatial index used for the candidate queries
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    /// Region quadtree (default)
    Quadtree,
    /// Packed Hilbert R-tree
    Hilbert,
}

/// Parses the process arguments, runs the adjustment and writes the outputs
///
/// # Errors
/// Fails on unreadable or malformed input and config files, invalid options, and
/// output write errors.
pub fn run() -> Result<()> {
    let args = Args::parse();
    let base = load_options(args.config.as_deref())?;
    let options = build_options(&args, base)?;

    let input = read_input(args.input.as_deref())?;
    let rectangles: RectangleSet =
        serde_json::from_str(&input).context("input is not a JSON array of rectangles")?;

    let frames = args.frames.is_some().then(|| FrameRecorder::new().with_max_frames(args.max_frames));
    let (adjustment, frames) = match args.index {
        IndexBackend::Quadtree => simulate::<QuadTree>(&rectangles, options, frames)?,
        IndexBackend::Hilbert => simulate::<HilbertRTree>(&rectangles, options, frames)?,
    };

    let json = serde_json::to_string_pretty(&adjustment.rectangles)?;
    write_output(&json, args.output.as_deref())?;

    if let (Some(path), Some(snapshots)) = (args.snapshots.as_deref(), adjustment.snapshots.as_ref()) {
        let json = serde_json::to_string(snapshots)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshots to {}", path.display()))?;
    }
    if let Some(dir) = args.frames.as_deref() {
        write_frames(dir, &frames)?;
    }

    if !args.quiet {
        let stats = &adjustment.stats;
        eprintln!(
            "{} rectangles, {} rounds, {} collisions resolved ({} in the last round), {} overlapping pairs left",
            adjustment.rectangles.len(),
            stats.iterations,
            stats.total_collisions(),
            stats.final_collisions(),
            adjustment.rectangles.overlap_count()
        );
    }
    Ok(())
}

fn simulate<I: SpatialIndex>(
    rectangles: &RectangleSet,
    options: AdjustOptions,
    frames: Option<FrameRecorder>,
) -> Result<(Adjustment, Vec<String>)> {
    let sim = ForceSimulator::new(options)?.with_index::<I>();
    match frames {
        Some(recorder) => {
            let mut sim = sim.with_observer(recorder);
            let adjustment = sim.run(rectangles)?;
            Ok((adjustment, sim.into_observer().into_frames()))
        }
        None => {
            let mut sim = sim;
            Ok((sim.run(rectangles)?, Vec::new()))
        }
    }
}

fn load_options(path: Option<&Path>) -> Result<AdjustOptions> {
    let Some(path) = path else {
        return Ok(AdjustOptions::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

fn build_options(args: &Args, mut options: AdjustOptions) -> Result<AdjustOptions> {
    if let Some(speed) = args.speed {
        options.speed = Some(speed);
    }
    if args.no_size_repulsion {
        options.adjust_by_size = false;
    }
    if let Some(radius_scale) = args.radius_scale {
        options.radius_scale = radius_scale;
    }
    if let Some(max_iterations) = args.max_iterations {
        options.max_iterations = max_iterations;
    }
    if let Some(margin) = args.margin {
        options.margin = margin;
    }
    if let Some(margin_type) = args.margin_type.as_deref() {
        options.margin_type = margin_type.parse::<MarginType>()?;
    }
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(max_items) = args.max_items {
        options.max_items_per_node = max_items;
    }
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if args.snapshots.is_some() {
        options.return_optimization_process = true;
    }
    options.validate()?;
    Ok(options)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path.filter(|p| *p != Path::new("-")) {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write output {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn write_frames(dir: &Path, frames: &[String]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create frame directory {}", dir.display()))?;
    for (idx, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("frame-{idx:05}.svg"));
        std::fs::write(&path, frame)
            .with_context(|| format!("failed to write frame {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("labeladjust").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&["--margin", "5", "--margin-type", "absolute", "-n", "7", "--no-size-repulsion"]);
        let base = AdjustOptions::default().with_seed(3).with_max_iterations(50);
        let options = build_options(&args, base).unwrap();
        assert_eq!(options.margin, 5.0);
        assert_eq!(options.margin_type, MarginType::Absolute);
        assert_eq!(options.max_iterations, 7);
        assert!(!options.adjust_by_size);
        assert_eq!(options.seed, Some(3));
    }

    #[test]
    fn unknown_margin_type_is_rejected() {
        let args = parse(&["--margin-type", "pixels"]);
        let err = build_options(&args, AdjustOptions::default()).unwrap_err();
        assert!(err.to_string().contains("pixels"));
    }

    #[test]
    fn snapshots_flag_enables_recording() {
        let args = parse(&["--snapshots", "out.json"]);
        let options = build_options(&args, AdjustOptions::default()).unwrap();
        assert!(options.return_optimization_process);
    }

    #[test]
    fn help_lists_documented_backends() {
        use clap::CommandFactory;
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("Region quadtree"));
        assert!(help.contains("Packed Hilbert R-tree"));
    }

    #[test]
    fn config_json_fills_defaults() {
        let options: AdjustOptions =
            serde_json::from_str(r#"{"margin": 10, "margin_type": "absolute"}"#).unwrap();
        assert_eq!(options.margin, 10.0);
        assert_eq!(options.radius_scale, 1.1);
        assert_eq!(options.max_iterations, 100);
        assert!(serde_json::from_str::<AdjustOptions>(r#"{"margin_type": "pixels"}"#).is_err());
    }
}
