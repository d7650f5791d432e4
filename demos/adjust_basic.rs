//! Push a small cluster of overlapping labels apart.
use labeladjust::prelude::*;

fn main() {
    let labels: RectangleSet = vec![
        Rectangle::new(0.0, 0.0, 3.0, 1.0),  // Label 0
        Rectangle::new(1.0, 0.4, 3.0, 1.0),  // Label 1 (overlaps 0)
        Rectangle::new(1.5, -0.3, 2.0, 1.0), // Label 2 (overlaps 0 and 1)
        Rectangle::new(10.0, 10.0, 2.0, 1.0), // Label 3 (far away)
    ]
    .into();

    let options = AdjustOptions::default()
        .with_seed(7)
        .with_max_iterations(150)
        .with_margin(10.0, MarginType::Percentage);
    let result = adjust_labels(&labels, &options).expect("valid input");

    println!("Overlapping pairs before: {}", labels.overlap_count());
    println!("Overlapping pairs after:  {}", result.rectangles.overlap_count());
    for (i, (before, after)) in labels.iter().zip(&result.rectangles).enumerate() {
        println!(
            "Label {i}: ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            before.x, before.y, after.x, after.y
        );
    }
    println!(
        "{} collisions over {} rounds",
        result.stats.total_collisions(),
        result.stats.iterations
    );

    // The distant label never meets another box
    let moved = result.rectangles[3].center().distance(&labels[3].center());
    assert!(moved < 1e-9, "Label 3 should not move");
}
