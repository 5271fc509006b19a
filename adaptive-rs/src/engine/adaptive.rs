use std::sync::atomic::AtomicBool;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;
use thousands::Separable;

use crate::config::AdaptiveConfig;
use crate::engine::clearing::{RegionOutcome, process_region};
use crate::engine::observer::{DebugObserver, NoopObserver};
use crate::engine::progress::ProgressReporter;
use crate::engine::regions::{Decomposition, decompose};
use crate::engine::run_state::RunState;
use crate::entities::{AdaptiveOutput, RunStats, Segment};
use crate::geometry::clip;
use crate::geometry::primitives::{IntRegion, PathSet};
use crate::geometry::scaling::bounding_box;

/// Adaptive clearing toolpath generator.
///
/// Given a stock boundary and a target boundary, produces tool center paths which remove the
/// material in between while keeping the cut area per distance close to the optimum set by the
/// step-over factor.
#[derive(Debug, Clone, Default)]
pub struct Adaptive2d {
    pub config: AdaptiveConfig,
}

/// Everything derived from the inputs before any region is processed
struct Prepared {
    run: RunState,
    stock: IntRegion,
    decomposition: Decomposition,
}

impl Adaptive2d {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self { config }
    }

    /// Generates the toolpaths, one [`AdaptiveOutput`] per processed region.
    /// `progress` receives the paths produced since its previous call and stops the run by returning `false`.
    pub fn execute(
        &self,
        stock: &PathSet,
        target: &PathSet,
        progress: impl FnMut(&[Segment]) -> bool,
    ) -> Vec<AdaptiveOutput> {
        self.execute_with_stats(stock, target, progress).0
    }

    /// Same as [`Adaptive2d::execute`], also returning the statistics of the run
    pub fn execute_with_stats(
        &self,
        stock: &PathSet,
        target: &PathSet,
        progress: impl FnMut(&[Segment]) -> bool,
    ) -> (Vec<AdaptiveOutput>, RunStats) {
        self.execute_observed(stock, target, progress, &mut NoopObserver)
    }

    /// Same as [`Adaptive2d::execute_with_stats`], reporting intermediate geometry to `observer`
    pub fn execute_observed(
        &self,
        stock: &PathSet,
        target: &PathSet,
        mut progress: impl FnMut(&[Segment]) -> bool,
        observer: &mut dyn DebugObserver,
    ) -> (Vec<AdaptiveOutput>, RunStats) {
        let start = Instant::now();
        let Some(prepared) = self.prepare(stock, target) else {
            return (vec![], RunStats::default());
        };
        let Prepared {
            run,
            stock,
            decomposition,
        } = &prepared;

        let mut reporter = ProgressReporter::new(&mut progress, None);
        let mut stats = RunStats {
            n_unreachable_regions: decomposition.n_unreachable,
            ..RunStats::default()
        };
        let mut outputs = vec![];
        for region in &decomposition.regions {
            if reporter.is_stopped() {
                stats.cancelled = true;
                break;
            }
            let RegionOutcome {
                output,
                stats: region_stats,
            } = process_region(run, stock, region, &mut reporter, observer);
            stats.merge(&region_stats);
            outputs.extend(output);
        }
        if !stats.cancelled {
            reporter.checkpoint(true);
        }
        log_summary(&stats, start);
        (outputs, stats)
    }

    /// Processes the regions in parallel.
    /// Outputs are returned in the same order as [`Adaptive2d::execute`] would produce them,
    /// a stop requested by `progress` stops all workers.
    pub fn execute_parallel(
        &self,
        stock: &PathSet,
        target: &PathSet,
        progress: impl Fn(&[Segment]) -> bool + Sync,
    ) -> (Vec<AdaptiveOutput>, RunStats) {
        let start = Instant::now();
        let Some(prepared) = self.prepare(stock, target) else {
            return (vec![], RunStats::default());
        };
        let Prepared {
            run,
            stock,
            decomposition,
        } = &prepared;
        let stop = AtomicBool::new(false);

        let outcomes: Vec<Option<RegionOutcome>> = decomposition
            .regions
            .par_iter()
            .map(|region| {
                let mut callback = |segments: &[Segment]| progress(segments);
                let mut reporter = ProgressReporter::new(&mut callback, Some(&stop));
                if reporter.is_stopped() {
                    return None;
                }
                let outcome = process_region(run, stock, region, &mut reporter, &mut NoopObserver);
                if !outcome.stats.cancelled {
                    reporter.checkpoint(true);
                }
                Some(outcome)
            })
            .collect();

        let mut stats = RunStats {
            n_unreachable_regions: decomposition.n_unreachable,
            ..RunStats::default()
        };
        let mut outputs = vec![];
        for outcome in outcomes {
            match outcome {
                Some(RegionOutcome {
                    output,
                    stats: region_stats,
                }) => {
                    stats.merge(&region_stats);
                    outputs.extend(output);
                }
                None => stats.cancelled = true,
            }
        }
        log_summary(&stats, start);
        (outputs, stats)
    }

    fn prepare(&self, stock: &PathSet, target: &PathSet) -> Option<Prepared> {
        let Some(bbox) = bounding_box(&[stock, target]) else {
            warn!("[ADAPT] degenerate input, nothing to clear");
            return None;
        };
        let run = RunState::new(&self.config, Some(bbox));
        info!(
            "[NORM] scale factor {:.3}, tool radius {:.1} (scaled)",
            run.scaler.scale_factor, run.tool_radius
        );
        let stock = run.scaler.region_from_paths(stock);
        let target = run.scaler.region_from_paths(target);
        if clip::is_empty(&stock) || clip::is_empty(&target) {
            warn!("[ADAPT] empty stock or target boundary, nothing to clear");
            return None;
        }
        let decomposition = decompose(&run, &stock, &target);
        Some(Prepared {
            run,
            stock,
            decomposition,
        })
    }
}

fn log_summary(stats: &RunStats, start: Instant) {
    info!(
        "[ADAPT] {} region(s), {} passes, {} steps ({} iterations) in {}ms{}",
        stats.n_regions,
        stats.n_passes,
        stats.n_steps.separate_with_commas(),
        stats.n_iterations.separate_with_commas(),
        start.elapsed().as_millis(),
        if stats.cancelled { ", cancelled" } else { "" }
    );
    if stats.n_unclear_links > 0 {
        warn!(
            "[ADAPT] {} linking moves cross uncleared material",
            stats.n_unclear_links
        );
    }
}
