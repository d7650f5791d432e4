//! Optimization process SVG dump
//! Writes one SVG per recorded snapshot, plus the candidate queries of the first
//! rounds, into `target/frames/`.

use labeladjust::diagnostics::{Canvas, FrameRecorder, render_frame_svg_on};
use labeladjust::prelude::*;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn write_svg(path: &Path, svg: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(svg.as_bytes())
}

fn main() -> std::io::Result<()> {
    let canvas = Canvas { width: 1280.0, height: 640.0, margin: 50.0 };

    // Labels crowded around a few anchor points
    let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
    let mut labels = RectangleSet::new();
    for (cx, cy) in [(10.0, 10.0), (30.0, 12.0), (20.0, 25.0)] {
        for _ in 0..12 {
            labels.push(Rectangle::new(
                cx + rng.random_range(-3.0..3.0),
                cy + rng.random_range(-2.0..2.0),
                rng.random_range(3.0..6.0),
                1.0,
            ));
        }
    }

    let options = AdjustOptions::default()
        .with_seed(11)
        .with_max_iterations(60)
        .with_optimization_process(true);
    let mut sim = ForceSimulator::new(options)
        .expect("valid options")
        .with_observer(FrameRecorder::new().with_canvas(canvas).with_max_frames(labels.len() * 3));
    let result = sim.run(&labels).expect("valid input");
    let queries = sim.into_observer().into_frames();

    let dir = Path::new("target/frames");
    std::fs::create_dir_all(dir)?;

    for (i, frame) in queries.iter().enumerate() {
        write_svg(&dir.join(format!("query-{i:04}.svg")), frame)?;
    }

    // Every 10th snapshot is plenty for an animation
    let snapshots = result.snapshots.unwrap_or_default();
    let mut written = 0;
    for (i, snapshot) in snapshots.iter().enumerate().step_by(10) {
        let svg = render_frame_svg_on(canvas, snapshot, None, &[]);
        write_svg(&dir.join(format!("snapshot-{i:05}.svg")), &svg)?;
        written += 1;
    }
    write_svg(&dir.join("final.svg"), &render_frame_svg_on(canvas, &result.rectangles, None, &[]))?;

    println!("Query frames: {}", queries.len());
    println!("Snapshots: {} ({} written)", snapshots.len(), written);
    println!(
        "Overlapping pairs: {} -> {}",
        labels.overlap_count(),
        result.rectangles.overlap_count()
    );
    println!("SVG files written to {}", dir.display());
    Ok(())
}
