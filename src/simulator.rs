//! Fixed-iteration force simulation.
//!
//! Each round recomputes the rectangle centres, rebuilds the spatial index over the
//! current geometry, then visits rectangles in ascending index order. Every
//! candidate the index reports for rectangle `i` (ascending, skipping `i` itself)
//! is handed to the repulsion rule with `i` first, and only the candidate moves.
//! Positions change in place, so later pairs in a round see the moves of earlier
//! ones. Centres are the exception: they are captured once per round.
//!
//! The loop always runs `max_iterations` rounds. It does not stop when a round
//! resolves nothing, and it does not guarantee that the result is overlap free.

use std::marker::PhantomData;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::margin::{MarginTransform, MarginType};
use crate::quadtree::QuadTree;
use crate::rectangle::{Point, RectangleSet};
use crate::repulsion::{RepulsionParams, repulse_pair};
use crate::spatial_index::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_ITEMS_PER_NODE, IndexParams, SpatialIndex};

/// Default number of rounds for [`adjust_labels`](crate::adjust_labels)
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
/// Default number of rounds for [`adjust_texts`](crate::adjust_texts)
pub const DEFAULT_TEXT_ITERATIONS: usize = 200;
/// Default sphere scale
pub const DEFAULT_RADIUS_SCALE: f64 = 1.1;

/// Simulation options
///
/// Deserializes from JSON with every field optional, e.g.
/// `{"margin": 10, "margin_type": "absolute", "seed": 3}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjustOptions {
    /// Step multiplier; `None` uses half the mean rectangle width
    pub speed: Option<f64>,
    /// Enables the size-based sphere test
    pub adjust_by_size: bool,
    /// Scales the collision sphere
    pub radius_scale: f64,
    /// Number of rounds, always run to completion
    pub max_iterations: usize,
    /// Margin added around every rectangle during the run
    pub margin: f64,
    /// Interpretation of `margin`
    pub margin_type: MarginType,
    /// Record a snapshot after every resolved collision
    pub return_optimization_process: bool,
    /// Seed for the jitter generator; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Leaf capacity of the spatial index
    pub max_items_per_node: usize,
    /// Depth limit of the spatial index
    pub max_depth: usize,
}

impl Default for AdjustOptions {
    fn default() -> Self {
        Self {
            speed: None,
            adjust_by_size: true,
            radius_scale: DEFAULT_RADIUS_SCALE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            margin: 0.0,
            margin_type: MarginType::Percentage,
            return_optimization_process: false,
            seed: None,
            max_items_per_node: DEFAULT_MAX_ITEMS_PER_NODE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AdjustOptions {
    /// Defaults used by the text adapter (200 rounds)
    pub fn for_texts() -> Self {
        Self { max_iterations: DEFAULT_TEXT_ITERATIONS, ..Self::default() }
    }

    /// Sets a fixed speed
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Enables or disables the sphere test
    #[must_use]
    pub fn with_adjust_by_size(mut self, enabled: bool) -> Self {
        self.adjust_by_size = enabled;
        self
    }

    /// Sets the sphere scale
    #[must_use]
    pub fn with_radius_scale(mut self, radius_scale: f64) -> Self {
        self.radius_scale = radius_scale;
        self
    }

    /// Sets the number of rounds
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the margin and how to interpret it
    #[must_use]
    pub fn with_margin(mut self, margin: f64, margin_type: MarginType) -> Self {
        self.margin = margin;
        self.margin_type = margin_type;
        self
    }

    /// Enables snapshot recording
    #[must_use]
    pub fn with_optimization_process(mut self, enabled: bool) -> Self {
        self.return_optimization_process = enabled;
        self
    }

    /// Fixes the jitter seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the spatial index parameters
    #[must_use]
    pub fn with_index_params(mut self, params: IndexParams) -> Self {
        self.max_items_per_node = params.max_items_per_node;
        self.max_depth = params.max_depth;
        self
    }

    /// Spatial index parameters
    pub fn index_params(&self) -> IndexParams {
        IndexParams {
            max_items_per_node: self.max_items_per_node,
            max_depth: self.max_depth,
        }
    }

    /// Checks ranges of the numeric options
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] naming the first bad option.
    pub fn validate(&self) -> Result<()> {
        let finite_non_negative = |name: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidParameter { name, value })
            }
        };
        if let Some(speed) = self.speed {
            finite_non_negative("speed", speed)?;
        }
        finite_non_negative("radius_scale", self.radius_scale)?;
        finite_non_negative("margin", self.margin)?;
        if self.max_items_per_node == 0 {
            return Err(Error::InvalidParameter { name: "max_items_per_node", value: 0.0 });
        }
        Ok(())
    }
}

/// Progress of one finished round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationReport {
    /// Zero-based round number
    pub iteration: usize,
    /// Total rounds in this run
    pub max_iterations: usize,
    /// Pairs whose repulsion fired during the round
    pub collisions: usize,
}

/// Hooks called synchronously from inside the loop
pub trait Observer {
    /// Called after rectangle `focus` is queried, before its pairs are resolved.
    /// `layout` carries margin-expanded geometry; `candidates` includes `focus`.
    fn on_candidates(&mut self, _layout: &RectangleSet, _focus: usize, _candidates: &[usize]) {}

    /// Called once at the end of every round
    fn on_iteration(&mut self, _report: &IterationReport) {}
}

/// Observer that ignores everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

impl<F: FnMut(&IterationReport)> Observer for F {
    fn on_iteration(&mut self, report: &IterationReport) {
        self(report);
    }
}

/// Collision counters of one run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Rounds executed
    pub iterations: usize,
    /// Fired pairs per round
    pub collisions_per_iteration: Vec<usize>,
    /// Times the sphere test fired
    pub sphere_hits: usize,
    /// Times the penetration test fired
    pub overlap_hits: usize,
}

impl SimulationStats {
    /// Pairs whose repulsion fired, over all rounds
    pub fn total_collisions(&self) -> usize {
        self.collisions_per_iteration.iter().sum()
    }

    /// Fired pairs in the final round, zero when no round ran
    pub fn final_collisions(&self) -> usize {
        self.collisions_per_iteration.last().copied().unwrap_or(0)
    }
}

/// Result of a run
#[derive(Clone, Debug, PartialEq)]
pub struct Adjustment {
    /// Adjusted rectangles in input order, sizes unchanged
    pub rectangles: RectangleSet,
    /// Margin-reverted layout after every resolved collision, when requested
    pub snapshots: Option<Vec<RectangleSet>>,
    /// Collision counters
    pub stats: SimulationStats,
}

/// Runs the simulation with a chosen index backend and observer
///
/// # Examples
/// ```
/// use labeladjust::prelude::*;
///
/// let labels: RectangleSet = vec![
///     Rectangle::new(0.0, 0.0, 2.0, 1.0),
///     Rectangle::new(0.5, 0.2, 2.0, 1.0),
/// ]
/// .into();
///
/// let mut rounds = 0;
/// let mut sim = ForceSimulator::new(AdjustOptions::default().with_seed(1))
///     .unwrap()
///     .with_index::<HilbertRTree>()
///     .with_observer(|_: &IterationReport| rounds += 1);
/// let adjusted = sim.run(&labels).unwrap();
/// drop(sim);
///
/// assert_eq!(rounds, 100);
/// assert_eq!(adjusted.rectangles.len(), 2);
/// ```
#[derive(Debug)]
pub struct ForceSimulator<I = QuadTree, O = NoopObserver> {
    options: AdjustOptions,
    observer: O,
    index: PhantomData<fn() -> I>,
}

impl ForceSimulator {
    /// Creates a simulator with the quadtree backend and no observer
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the options are out of range.
    pub fn new(options: AdjustOptions) -> Result<Self> {
        options.validate()?;
        Ok(ForceSimulator { options, observer: NoopObserver, index: PhantomData })
    }
}

impl<I: SpatialIndex, O: Observer> ForceSimulator<I, O> {
    /// Switches the index backend
    #[must_use]
    pub fn with_index<J: SpatialIndex>(self) -> ForceSimulator<J, O> {
        ForceSimulator { options: self.options, observer: self.observer, index: PhantomData }
    }

    /// Installs an observer
    #[must_use]
    pub fn with_observer<P: Observer>(self, observer: P) -> ForceSimulator<I, P> {
        ForceSimulator { options: self.options, observer, index: PhantomData }
    }

    /// Options in effect
    pub fn options(&self) -> &AdjustOptions {
        &self.options
    }

    /// Gives back the observer
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Adjusts a copy of `input`; `input` itself is never modified
    ///
    /// # Errors
    /// Returns [`Error::NegativeSize`] or [`Error::NonFiniteGeometry`] for bad input.
    pub fn run(&mut self, input: &RectangleSet) -> Result<Adjustment> {
        input.validate()?;
        let options = &self.options;

        let speed = options.speed.unwrap_or_else(|| 0.5 * input.mean_width());
        let params = RepulsionParams {
            speed,
            adjust_by_size: options.adjust_by_size,
            radius_scale: options.radius_scale,
        };
        let index_params = options.index_params();
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let margins = MarginTransform::new(input, options.margin, options.margin_type);
        let mut layout = input.clone();
        margins.expand(&mut layout);

        info!(
            rectangles = layout.len(),
            max_iterations = options.max_iterations,
            speed,
            margin = options.margin,
            "starting label adjustment"
        );

        let mut snapshots = options.return_optimization_process.then(Vec::new);
        let mut stats = SimulationStats::default();
        let mut centers: Vec<Point> = Vec::with_capacity(layout.len());
        let mut candidates: Vec<usize> = Vec::new();

        for iteration in 0..options.max_iterations {
            layout.centers_into(&mut centers);
            let index = I::bulk_load(&layout, &index_params);
            let mut collisions = 0usize;

            for i in 0..layout.len() {
                index.query(&layout[i].bounds(), &mut candidates);
                self.observer.on_candidates(&layout, i, &candidates);

                for &j in &candidates {
                    if j == i {
                        continue;
                    }
                    let outcome =
                        repulse_pair(layout.as_mut_slice(), &centers, i, j, &params, &mut rng);
                    if !outcome.is_collision() {
                        continue;
                    }
                    collisions += 1;
                    stats.sphere_hits += usize::from(outcome.sphere.is_some());
                    stats.overlap_hits += usize::from(outcome.overlap.is_some());
                    trace!(iteration, first = i, second = j, ?outcome, "collision");
                    if let Some(snapshots) = snapshots.as_mut() {
                        snapshots.push(margins.contracted(&layout));
                    }
                }
            }

            stats.collisions_per_iteration.push(collisions);
            stats.iterations += 1;
            debug!(iteration, collisions, "round finished");
            self.observer.on_iteration(&IterationReport {
                iteration,
                max_iterations: options.max_iterations,
                collisions,
            });
        }

        margins.contract(&mut layout);
        debug!(
            total_collisions = stats.total_collisions(),
            final_collisions = stats.final_collisions(),
            remaining_overlaps = layout.overlap_count(),
            "label adjustment finished"
        );

        Ok(Adjustment { rectangles: layout, snapshots, stats })
    }
}

/// Adjusts `rectangles` with the default quadtree index
///
/// # Errors
/// Returns an error for invalid options or input geometry.
pub fn adjust_labels(rectangles: &RectangleSet, options: &AdjustOptions) -> Result<Adjustment> {
    adjust_labels_with::<QuadTree>(rectangles, options)
}

/// Adjusts `rectangles` with a chosen index backend
///
/// # Errors
/// Returns an error for invalid options or input geometry.
pub fn adjust_labels_with<I: SpatialIndex>(
    rectangles: &RectangleSet,
    options: &AdjustOptions,
) -> Result<Adjustment> {
    ForceSimulator::new(options.clone())?.with_index::<I>().run(rectangles)
}
