use log::{debug, info, warn};
use thousands::Separable;

use crate::engine::assembler::PassAssembler;
use crate::engine::cleared::{ClearedArea, ClearedSnapshot, calc_cut_area};
use crate::engine::consts::{
    AREA_ERROR_FACTOR, CLEAN_PATH_TOLERANCE, FINISHING_CLEAN_PATH_TOLERANCE, PASSES_LIMIT,
};
use crate::engine::engage::EngageWalker;
use crate::engine::entry::{Entry, find_entry_inside, find_entry_outside, outside_stock};
use crate::engine::observer::{DebugLayer, DebugObserver};
use crate::engine::progress::ProgressReporter;
use crate::engine::regions::Region;
use crate::engine::run_state::RunState;
use crate::engine::stepper::{PassEnd, PassResult, run_pass};
use crate::entities::{AdaptiveOutput, MotionType, RunStats, Segment};
use crate::geometry::clip;
use crate::geometry::path_utils::{
    clean_path, pop_path_closest_to, region_area, region_contains, rings,
};
use crate::geometry::primitives::{IntPath, IntRegion};

/// Result of processing one region
#[derive(Debug, Clone)]
pub struct RegionOutcome {
    /// `None` when the region is unreachable or produced no motion
    pub output: Option<AdaptiveOutput>,
    pub stats: RunStats,
}

/// Clears one region: entry, adaptive passes, finishing pass and return motion
pub fn process_region(
    run: &RunState,
    stock: &IntRegion,
    region: &Region,
    reporter: &mut ProgressReporter,
    observer: &mut dyn DebugObserver,
) -> RegionOutcome {
    let mut stats = RunStats {
        n_regions: 1,
        ..RunStats::default()
    };
    if observer.enabled() {
        observer.clear_screen();
        draw_rings(run, observer, &region.tool_bound_rings, DebugLayer::ToolBound);
    }

    let Some(entry) = find_entry(run, stock, region) else {
        warn!("[ENTRY] region {}: no entry point, unreachable", region.index);
        stats.n_unreachable_regions = 1;
        return RegionOutcome {
            output: None,
            stats,
        };
    };
    info!(
        "[ENTRY] region {}: {} entry at {:?}",
        region.index,
        if entry.from_outside { "outside" } else { "helix" },
        run.scaler.to_float(entry.helix_center)
    );
    if observer.enabled() {
        let radius = run.scaler.unscale(entry.helix_radius.max(run.tool_radius));
        observer.draw_circle(run.scaler.to_float(entry.helix_center), radius, DebugLayer::Entry);
    }

    let mut cleared = ClearedArea::new(&run.tool, entry.cleared.clone());
    let clear_at_start = clip::union(&entry.cleared, &outside_stock(run, region, stock));
    let mut assembler = PassAssembler::new(run, entry.helix_center, entry.tool_pos, clear_at_start);
    // follows the edge of the cleared area, rebuilt whenever a pass changes it
    let mut walker: Option<EngageWalker> = None;
    let (mut pos, mut dir) = (entry.tool_pos, entry.dir);

    for pass_idx in 0..PASSES_LIMIT {
        assembler.link_to(pos, &mut cleared, region, reporter, &mut stats);
        let before_pass = cleared.snapshot();
        let pass = run_pass(run, region, &mut cleared, pos, dir, reporter, &mut stats);
        debug!(
            "[PASS] region {} pass {pass_idx}: {} points, ended by {:?}",
            region.index,
            pass.path.len(),
            pass.end
        );
        if settle_pass(run, &mut cleared, before_pass, &pass) {
            let path = clean_path(&pass.path, CLEAN_PATH_TOLERANCE);
            assembler.append_cut(&path);
            stats.n_passes += 1;
            walker = None;
            if observer.enabled() {
                observer.draw_path(&run.scaler.path_to_float(&path), DebugLayer::Pass);
            }
        } else {
            stats.n_dropped_passes += 1;
        }
        if pass.end == PassEnd::Cancelled || !reporter.checkpoint(true) {
            stats.cancelled = true;
            break;
        }
        let remaining = clip::measure_difference(&region.bound, cleared.full()).area;
        if remaining < run.min_pass_cut_area() {
            break;
        }
        let engage = walker.get_or_insert_with(|| {
            let mut w = EngageWalker::new(rings(cleared.full())).with_inset(run.engage_inset());
            w.move_to_closest_point(pass.path.last().copied().unwrap_or(pos));
            w
        });
        let engaged = engage.next_engage_point(
            &mut cleared,
            &run.tool,
            run.engage_scan_step(),
            run.engage_area_range(),
            Some(&region.tool_bound),
        );
        if !engaged {
            debug!("[PASS] region {}: no further engage point", region.index);
            break;
        }
        (pos, dir) = (engage.tool_point(), engage.current_dir());
        if observer.enabled() {
            let radius = run.scaler.unscale(run.tool_radius);
            observer.draw_circle(run.scaler.to_float(pos), radius, DebugLayer::EngagePoint);
        }
    }

    if !stats.cancelled {
        finishing_pass(
            run,
            stock,
            region,
            &mut cleared,
            &mut assembler,
            reporter,
            &mut stats,
            observer,
        );
    }

    let machined = clip::intersection(&region.material, stock);
    stats.cleared_area = run
        .scaler
        .unscale_area(region_area(&clip::intersection(cleared.full(), &machined)));
    let output = assembler.finish(&mut cleared, region, &mut stats);
    info!(
        "[REGION] region {} done: {} passes, {} steps, {:.3} units² cleared",
        region.index,
        stats.n_passes,
        stats.n_steps.separate_with_commas(),
        stats.cleared_area
    );
    RegionOutcome { output, stats }
}

/// Whether `pass` removed enough material to be emitted.
/// Otherwise its moves are taken back out of `cleared`, except for the footprint where the tool went down.
fn settle_pass(
    run: &RunState,
    cleared: &mut ClearedArea,
    before_pass: ClearedSnapshot,
    pass: &PassResult,
) -> bool {
    if pass.cut_area > run.min_pass_cut_area() {
        return true;
    }
    cleared.restore(before_pass);
    if let Some(start) = pass.path.first() {
        cleared.record_position(*start);
    }
    false
}

fn find_entry(run: &RunState, stock: &IntRegion, region: &Region) -> Option<Entry> {
    let outside = match run.config.force_inside_out {
        true => None,
        false => find_entry_outside(run, region, stock),
    };
    outside.or_else(|| find_entry_inside(run, region))
}

/// Follows the walls of the region nearest-first, removing what the adaptive passes left
#[allow(clippy::too_many_arguments)]
fn finishing_pass(
    run: &RunState,
    stock: &IntRegion,
    region: &Region,
    cleared: &mut ClearedArea,
    assembler: &mut PassAssembler,
    reporter: &mut ProgressReporter,
    stats: &mut RunStats,
    observer: &mut dyn DebugObserver,
) {
    let mut paths = region.finishing_paths.clone();
    while let Some(mut path) = pop_path_closest_to(&mut paths, assembler.last_point()) {
        if !path.iter().any(|p| region_contains(stock, *p)) {
            continue;
        }
        path.push(path[0]);
        assembler.link_to(path[0], cleared, region, reporter, stats);

        let mut n_overcuts = 0;
        for w in path.windows(2) {
            let length = w[0].distance(&w[1]);
            let reach = length + run.tool_radius + 1.0;
            let area = calc_cut_area(&run.tool, cleared.window(w[0], reach), w[0], w[1]).area;
            if area > run.optimal_cut_area_pd * length * (1.0 + AREA_ERROR_FACTOR) {
                n_overcuts += 1;
            }
            cleared.record_move(w[0], w[1]);
        }
        if n_overcuts > 0 {
            warn!(
                "[FINISH] region {}: {n_overcuts} finishing steps above optimal engagement",
                region.index
            );
            stats.n_finishing_overcuts += n_overcuts;
        }

        let path: IntPath = clean_path(&path, FINISHING_CLEAN_PATH_TOLERANCE);
        assembler.append_cut(&path);
        let segment = Segment::new(MotionType::Cutting, run.scaler.path_to_float(&path));
        reporter.push_segment(segment);
        if observer.enabled() {
            observer.draw_path(&run.scaler.path_to_float(&path), DebugLayer::Finishing);
        }
        if !reporter.checkpoint(true) {
            stats.cancelled = true;
            break;
        }
    }
}

fn draw_rings(
    run: &RunState,
    observer: &mut dyn DebugObserver,
    rings: &[IntPath],
    layer: DebugLayer,
) {
    for ring in rings {
        let mut path = run.scaler.path_to_float(ring);
        if let Some(first) = path.first().copied() {
            path.push(first);
        }
        observer.draw_path(&path, layer);
    }
}
