use std::collections::VecDeque;

use log::{debug, trace};

use crate::engine::cleared::{ClearedArea, calc_cut_area};
use crate::engine::consts::{
    ANGLE_HISTORY_POINTS, AREA_ERROR_FACTOR, CONVENTIONAL_SIDE_FACTOR, DIRECTION_SMOOTHING_BUFLEN,
    MAX_ANGLE, MAX_ESCAPE_TURNS, MAX_ITERATIONS, MIN_ANGLE, OVERLOAD_BOUND_FACTOR,
    POINTS_PER_PASS_LIMIT, RESOLUTION_FACTOR,
};
use crate::engine::interpolation::{AngleInterpolator, clamp_angle};
use crate::engine::progress::ProgressReporter;
use crate::engine::regions::Region;
use crate::engine::run_state::RunState;
use crate::entities::{MotionType, RunStats};
use crate::geometry::clip::AreaMeasure;
use crate::geometry::path_utils::{
    average_direction, distance_to_rings, first_intersection, region_contains,
};
use crate::geometry::primitives::{DirVec, IntPath, IntPoint, IntRegion};

/// Why a pass stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEnd {
    /// The tool reached the edge of the tool bound
    Boundary,
    /// The tool runs through already cleared area
    NoMaterial,
    /// Even the best candidate step overloads the tool
    Overload,
    /// Not even the sharpest turn into the material reaches the optimal cut area
    Underload,
    /// Continuing would cut with the material on the wrong side
    Conventional,
    PointLimit,
    Cancelled,
}

/// Tool center path of one adaptive pass
#[derive(Debug, Clone)]
pub struct PassResult {
    pub path: IntPath,
    /// Material removed by the pass, in scaled units²
    pub cut_area: f64,
    pub end: PassEnd,
}

/// Candidate step evaluated during the angle search
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Steering angle relative to the smoothed direction
    angle: f64,
    pos: IntPoint,
    measure: AreaMeasure,
    /// Cut area per distance relative to the optimum, minus one
    error: f64,
    converged: bool,
}

/// Runs a single adaptive pass from `start`, heading towards `dir`.
///
/// Every step searches the steering angle for which the newly cut area matches the optimal cut
/// area of the step. Steps are only accepted within [`OVERLOAD_BOUND_FACTOR`] of the optimum:
/// out of band steps are retried at the minimal step length, and when the minimal step still
/// overloads the search turns towards the cleared side, up to [`MAX_ESCAPE_TURNS`] times.
/// Accepted moves are recorded in `cleared` and streamed to the `reporter`.
pub fn run_pass(
    run: &RunState,
    region: &Region,
    cleared: &mut ClearedArea,
    start: IntPoint,
    dir: DirVec,
    reporter: &mut ProgressReporter,
    stats: &mut RunStats,
) -> PassResult {
    let r = run.tool_radius;
    let optimal_pd = run.optimal_cut_area_pd;

    let mut pos = start;
    let mut path = vec![start];
    let mut cut_area = 0.0;
    let mut gyro: VecDeque<DirVec> = std::iter::repeat_n(dir, DIRECTION_SMOOTHING_BUFLEN).collect();
    let mut angle_history: VecDeque<f64> = VecDeque::with_capacity(ANGLE_HISTORY_POINTS);
    let mut interpolator = AngleInterpolator::default();
    let mut last_angle = 0.0;
    // the first step of a pass has no history to predict from
    let mut slow_down = true;

    cleared.record_position(start);
    reporter.begin_segment(MotionType::Cutting, run.scaler.to_float(start));

    let end = loop {
        if path.len() >= POINTS_PER_PASS_LIMIT {
            break PassEnd::PointLimit;
        }
        let smoothed = average_direction(&gyro);
        let dist_to_bound = distance_to_rings(&region.tool_bound_rings, pos);

        let step = match slow_down {
            true => RESOLUTION_FACTOR,
            false if dist_to_bound < run.slow_down_distance() => RESOLUTION_FACTOR,
            false if f64::abs(last_angle) > 1.0e-5 => RESOLUTION_FACTOR / f64::abs(last_angle),
            false => 4.0 * RESOLUTION_FACTOR,
        }
        .clamp(RESOLUTION_FACTOR, run.max_step());
        let at_min_step = step <= RESOLUTION_FACTOR;
        let reach = step + r + 1.0;

        let predicted = match angle_history.is_empty() {
            true => 0.0,
            false => angle_history.iter().sum::<f64>() / angle_history.len() as f64,
        };
        let best = {
            let window = cleared.window(pos, reach);
            let search = StepSearch {
                run,
                window,
                pos,
                step,
            };
            let mut best = search.best_angle(&mut interpolator, smoothed, 0.0, predicted, stats);
            if at_min_step {
                for turn in 1..=MAX_ESCAPE_TURNS {
                    if best.is_none_or(|b| b.error <= OVERLOAD_BOUND_FACTOR) {
                        break;
                    }
                    let offset = turn as f64 * MAX_ANGLE;
                    trace!("[PASS] escape turn {turn} at {pos:?}");
                    let escaped = search.best_angle(&mut interpolator, smoothed, offset, 0.0, stats);
                    if let Some(e) = escaped {
                        if best.is_none_or(|b| e.error.abs() < b.error.abs()) {
                            best = Some(e);
                        }
                    }
                }
            }
            best
        };
        let Some(mut best) = best else {
            break PassEnd::NoMaterial;
        };

        let mut at_boundary = false;
        if dist_to_bound <= step + 1.0 && !region_contains(&region.tool_bound, best.pos) {
            let clipped = first_intersection(&region.tool_bound_rings, pos, best.pos).unwrap_or(pos);
            if clipped == pos {
                break PassEnd::Boundary;
            }
            best.pos = clipped;
            best.measure = calc_cut_area(&run.tool, cleared.window(pos, reach), pos, clipped);
            at_boundary = true;
        }

        let move_length = pos.distance(&best.pos);
        let ratio = best.measure.area / move_length / optimal_pd;
        if best.measure.area < run.min_step_cut_area() {
            break PassEnd::NoMaterial;
        }
        if (ratio - 1.0).abs() > OVERLOAD_BOUND_FACTOR {
            if !at_min_step {
                // retry the same position with the smallest step
                slow_down = true;
                continue;
            }
            if at_boundary {
                break PassEnd::Boundary;
            }
            if ratio > 1.0 {
                stats.n_overload_stops += 1;
                debug!("[PASS] overload stop, {ratio:.2}x optimal engagement");
                break PassEnd::Overload;
            }
            stats.n_underload_stops += 1;
            debug!("[PASS] underload stop, {ratio:.2}x optimal engagement");
            break PassEnd::Underload;
        }
        let move_dir = DirVec::between(pos, best.pos);
        if run.config.prevent_conventional_mode {
            if let Some(c) = best.measure.centroid {
                let to_centroid = DirVec(c.0 - pos.0 as f64, c.1 - pos.1 as f64);
                if move_dir.cross(&to_centroid) > CONVENTIONAL_SIDE_FACTOR * r {
                    trace!("[PASS] conventional cut ahead at {pos:?}");
                    break PassEnd::Conventional;
                }
            }
        }

        if !best.converged {
            stats.n_unconverged += 1;
        }
        cleared.record_move(pos, best.pos);
        path.push(best.pos);
        reporter.push_point(run.scaler.to_float(best.pos));
        cut_area += best.measure.area;
        stats.n_steps += 1;
        stats.record_engagement(ratio);

        if angle_history.len() == ANGLE_HISTORY_POINTS {
            angle_history.pop_front();
        }
        angle_history.push_back(clamp_angle(best.angle));
        last_angle = best.angle;
        gyro.pop_front();
        gyro.push_back(move_dir);
        pos = best.pos;
        slow_down = false;

        if at_boundary {
            break PassEnd::Boundary;
        }
        if !reporter.checkpoint(false) {
            break PassEnd::Cancelled;
        }
    };

    trace!(
        "[PASS] {} points, cut area {:.1}, ended by {end:?}",
        path.len(),
        cut_area
    );
    PassResult {
        path,
        cut_area,
        end,
    }
}

/// Angle search for one step of fixed length from `pos`
struct StepSearch<'a> {
    run: &'a RunState,
    window: &'a IntRegion,
    pos: IntPoint,
    step: f64,
}

impl StepSearch<'_> {
    /// Searches the steering angle within [`MIN_ANGLE`], [`MAX_ANGLE`] around `dir` rotated by `offset`.
    /// Returns the candidate closest to the optimal cut area, with its angle relative to `dir`.
    fn best_angle(
        &self,
        interpolator: &mut AngleInterpolator,
        dir: DirVec,
        offset: f64,
        predicted: f64,
        stats: &mut RunStats,
    ) -> Option<Candidate> {
        let optimal_pd = self.run.optimal_cut_area_pd;
        let reference = dir.rotate(offset);
        interpolator.clear();
        let mut best: Option<Candidate> = None;
        let mut prev_error = f64::MAX;
        for iteration in 0..MAX_ITERATIONS {
            stats.n_iterations += 1;
            let angle = clamp_angle(match iteration {
                0 => predicted,
                1 => MIN_ANGLE,
                3 => MAX_ANGLE,
                _ if interpolator.n_points() < 2 => interpolator.seed_angle(iteration),
                _ => interpolator.interpolate_angle(optimal_pd),
            });
            let pos = self.pos.translate(reference.rotate(angle), self.step);
            let measure = calc_cut_area(&self.run.tool, self.window, self.pos, pos);
            // grid rounding changes the step length slightly, compare per distance
            let area_pd = measure.area / self.pos.distance(&pos).max(1.0);
            interpolator.add_point(area_pd, angle);
            let error = area_pd / optimal_pd - 1.0;
            let converged = error.abs() < AREA_ERROR_FACTOR;
            if best.is_none_or(|b| error.abs() < b.error.abs()) {
                best = Some(Candidate {
                    angle: offset + angle,
                    pos,
                    measure,
                    error,
                    converged,
                });
            }
            if converged {
                break;
            }
            if iteration > 5 && (error - prev_error).abs() * optimal_pd < 0.001 {
                break;
            }
            prev_error = error;
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdaptiveConfig;
    use crate::engine::entry::find_entry_inside;
    use crate::engine::regions::decompose;
    use crate::entities::Segment;
    use crate::geometry::clip;
    use crate::geometry::primitives::{IntRect, IntRegion, Rect};

    fn square(min: i64, max: i64) -> IntRegion {
        clip::rect_region(&IntRect {
            x_min: min,
            y_min: min,
            x_max: max,
            y_max: max,
        })
    }

    /// Runs the first pass of a 2000 wide square pocket, starting from its helix
    fn spiral_pass(run: &RunState, region: &Region) -> (PassResult, RunStats, IntRegion) {
        let entry = find_entry_inside(run, region).unwrap();
        let mut cleared = ClearedArea::new(&run.tool, entry.cleared.clone());
        let mut callback = |_: &[Segment]| true;
        let mut reporter = ProgressReporter::new(&mut callback, None);
        let mut stats = RunStats::default();
        let pass = run_pass(
            run,
            region,
            &mut cleared,
            entry.tool_pos,
            entry.dir,
            &mut reporter,
            &mut stats,
        );
        (pass, stats, entry.cleared)
    }

    fn square_pocket() -> (RunState, IntRegion) {
        let config = AdaptiveConfig {
            tolerance: 0.2,
            ..AdaptiveConfig::default()
        };
        let run = RunState::new(&config, Rect::try_new(0.0, 0.0, 50.0, 50.0).ok());
        (run, square(0, 2000))
    }

    #[test]
    fn spiral_pass_keeps_engagement_bounded() {
        let (run, stock) = square_pocket();
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        let (pass, stats, _) = spiral_pass(&run, region);

        assert!(pass.path.len() > 10);
        assert!(pass.cut_area > run.min_pass_cut_area());
        assert_ne!(pass.end, PassEnd::Cancelled);
        assert!(stats.n_steps > 0);
        assert!(stats.max_engagement_ratio <= 1.0 + OVERLOAD_BOUND_FACTOR + 1.0e-9);
        assert!(stats.min_engagement_ratio.unwrap() >= 1.0 - OVERLOAD_BOUND_FACTOR - 1.0e-9);
        for p in &pass.path[1..] {
            // boundary hits are rounded onto the grid
            assert!(
                region_contains(&region.tool_bound, *p)
                    || distance_to_rings(&region.tool_bound_rings, *p) < 1.5
            );
        }
        // the spiral grows out from the helix towards the walls, 900 away
        let center = IntPoint(1000, 1000);
        let reached = pass.path.iter().map(|p| p.distance(&center)).fold(0.0, f64::max);
        assert!(reached > 450.0, "spiral stopped {reached:.0} from its center");
    }

    #[test]
    fn accepted_steps_cut_the_optimal_area() {
        let (run, stock) = square_pocket();
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        let (pass, _, initial) = spiral_pass(&run, region);

        // replays the pass against a fresh accumulator
        let mut cleared = ClearedArea::new(&run.tool, initial);
        cleared.record_position(pass.path[0]);
        for w in pass.path.windows(2) {
            let length = w[0].distance(&w[1]);
            let window = cleared.window(w[0], length + run.tool_radius + 1.0);
            let area = calc_cut_area(&run.tool, window, w[0], w[1]).area;
            let ratio = area / length / run.optimal_cut_area_pd;
            // snapping of the replayed accumulator differs slightly
            assert!(
                (ratio - 1.0).abs() <= 2.0 * AREA_ERROR_FACTOR + 0.02,
                "step {:?} -> {:?} cuts {ratio:.3}x optimal",
                w[0],
                w[1]
            );
            cleared.record_move(w[0], w[1]);
        }
    }

    #[test]
    fn pass_without_material_ahead_stops() {
        let (run, stock) = square_pocket();
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        // everything is cleared already
        let mut cleared = ClearedArea::new(&run.tool, stock.clone());
        let mut callback = |_: &[Segment]| true;
        let mut reporter = ProgressReporter::new(&mut callback, None);
        let mut stats = RunStats::default();
        let start = IntPoint(1000, 1000);
        let pass = run_pass(
            &run,
            region,
            &mut cleared,
            start,
            DirVec(1.0, 0.0),
            &mut reporter,
            &mut stats,
        );
        assert_eq!(pass.end, PassEnd::NoMaterial);
        assert_eq!(pass.path, vec![start]);
        assert_eq!(stats.n_steps, 0);
        assert_eq!(stats.min_engagement_ratio, None);
    }

    #[test]
    fn cancelled_pass_stops_early() {
        let (run, stock) = square_pocket();
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        let entry = find_entry_inside(&run, region).unwrap();

        let mut cleared = ClearedArea::new(&run.tool, entry.cleared.clone());
        let mut callback = |_: &[Segment]| false;
        let mut reporter = ProgressReporter::new(&mut callback, None);
        let mut stats = RunStats::default();
        let pass = run_pass(
            &run,
            region,
            &mut cleared,
            entry.tool_pos,
            entry.dir,
            &mut reporter,
            &mut stats,
        );
        assert_eq!(pass.end, PassEnd::Cancelled);
        assert_eq!(pass.path.len(), 2);
    }
}
