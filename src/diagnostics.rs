//! SVG frames of a layout, for debugging and animation.
//!
//! A frame draws every rectangle in grey, the candidates of one query in red and
//! the queried rectangle in blue. [`FrameRecorder`] plugs into the simulator as an
//! [`Observer`] and renders one frame per candidate query.

use crate::rectangle::{Bounds, RectangleSet};
use crate::simulator::{IterationReport, Observer};

/// Canvas settings for rendered frames
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    /// Image width in pixels
    pub width: f64,
    /// Image height in pixels
    pub height: f64,
    /// Blank border in pixels
    pub margin: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas { width: 800.0, height: 600.0, margin: 20.0 }
    }
}

/// Maps layout coordinates (y up) onto the canvas (y down), keeping the aspect ratio
#[derive(Clone, Copy, Debug)]
struct Viewport {
    bounds: Bounds,
    scale: f64,
    canvas: Canvas,
}

impl Viewport {
    fn fit(bounds: Bounds, canvas: Canvas) -> Self {
        let inner_w = (canvas.width - 2.0 * canvas.margin).max(1.0);
        let inner_h = (canvas.height - 2.0 * canvas.margin).max(1.0);
        let sx = if bounds.width() > 0.0 { inner_w / bounds.width() } else { 1.0 };
        let sy = if bounds.height() > 0.0 { inner_h / bounds.height() } else { 1.0 };
        Viewport { bounds, scale: sx.min(sy), canvas }
    }

    fn rect(&self, b: &Bounds) -> (f64, f64, f64, f64) {
        let x = self.canvas.margin + (b.min_x - self.bounds.min_x) * self.scale;
        let y = self.canvas.height - self.canvas.margin - (b.max_y - self.bounds.min_y) * self.scale;
        (x, y, b.width() * self.scale, b.height() * self.scale)
    }
}

/// Renders one frame with the default canvas
pub fn render_frame_svg(layout: &RectangleSet, focus: Option<usize>, candidates: &[usize]) -> String {
    render_frame_svg_on(Canvas::default(), layout, focus, candidates)
}

/// Renders one frame on the given canvas
pub fn render_frame_svg_on(
    canvas: Canvas,
    layout: &RectangleSet,
    focus: Option<usize>,
    candidates: &[usize],
) -> String {
    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg width=\"{w}\" height=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\">\n",
        w = canvas.width,
        h = canvas.height
    ));
    svg.push_str("  <defs>\n");
    svg.push_str("    <style>\n");
    svg.push_str("      .rect { fill: none; stroke: #999999; stroke-width: 1; }\n");
    svg.push_str("      .candidate { fill: none; stroke: #D62728; stroke-width: 1.5; }\n");
    svg.push_str("      .focus { fill: #1F77B4; fill-opacity: 0.25; stroke: #1F77B4; stroke-width: 2; }\n");
    svg.push_str("    </style>\n");
    svg.push_str("  </defs>\n");

    if let Some(bounds) = layout.bounds() {
        let view = Viewport::fit(bounds, canvas);
        let mut draw = |index: usize, class: &str| {
            if let Some(rect) = layout.get(index) {
                let (x, y, w, h) = view.rect(&rect.bounds());
                svg.push_str(&format!(
                    "  <rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" class=\"{class}\"><title>{index}</title></rect>\n"
                ));
            }
        };
        for index in 0..layout.len() {
            draw(index, "rect");
        }
        for &index in candidates {
            draw(index, "candidate");
        }
        if let Some(index) = focus {
            draw(index, "focus");
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Observer that renders a frame for every candidate query
///
/// Frames can get numerous: one per rectangle per round. `max_frames` caps them.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    canvas: Canvas,
    max_frames: Option<usize>,
    frames: Vec<String>,
    iterations: usize,
}

impl FrameRecorder {
    /// Records every frame on the default canvas
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops recording after `max_frames` frames
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Uses a custom canvas
    #[must_use]
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Frames recorded so far
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Rounds observed so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Takes the recorded frames
    pub fn into_frames(self) -> Vec<String> {
        self.frames
    }
}

impl Observer for FrameRecorder {
    fn on_candidates(&mut self, layout: &RectangleSet, focus: usize, candidates: &[usize]) {
        if self.max_frames.is_some_and(|max| self.frames.len() >= max) {
            return;
        }
        self.frames.push(render_frame_svg_on(self.canvas, layout, Some(focus), candidates));
    }

    fn on_iteration(&mut self, _report: &IterationReport) {
        self.iterations += 1;
    }
}
