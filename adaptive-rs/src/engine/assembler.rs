use log::{debug, trace};

use crate::engine::cleared::{ClearedArea, calc_cut_area};
use crate::engine::consts::{CLEAR_LINK_AREA, OVERLOAD_BOUND_FACTOR};
use crate::engine::progress::ProgressReporter;
use crate::engine::regions::Region;
use crate::engine::run_state::RunState;
use crate::entities::{AdaptiveOutput, MotionType, RunStats, Segment};
use crate::geometry::clip;
use crate::geometry::footprint::Footprint;
use crate::geometry::path_utils::region_contains;
use crate::geometry::primitives::{DirVec, IntPoint, IntRegion, Path};

/// Collects the passes of one region into an [`AdaptiveOutput`], inserting classified links between them
pub struct PassAssembler<'r> {
    run: &'r RunState,
    /// Slightly narrower than the tool, so links grazing the cleared boundary still count as clear
    link_tool: Footprint,
    helix_center: IntPoint,
    start_point: IntPoint,
    /// Free of material before the first pass: the entry footprint and everything outside the stock
    clear_at_start: IntRegion,
    last_point: IntPoint,
    segments: Vec<Segment>,
}

impl<'r> PassAssembler<'r> {
    pub fn new(
        run: &'r RunState,
        helix_center: IntPoint,
        start_point: IntPoint,
        clear_at_start: IntRegion,
    ) -> Self {
        Self {
            run,
            link_tool: Footprint::new((run.tool_radius - 2.0).max(1.0)),
            helix_center,
            start_point,
            clear_at_start,
            last_point: start_point,
            segments: vec![],
        }
    }

    pub fn last_point(&self) -> IntPoint {
        self.last_point
    }

    /// Moves the tool from the last point to `to` with a classified linking motion
    pub fn link_to(
        &mut self,
        to: IntPoint,
        cleared: &mut ClearedArea,
        region: &Region,
        reporter: &mut ProgressReporter,
        stats: &mut RunStats,
    ) {
        let from = self.last_point;
        if from == to {
            return;
        }
        let motion = self.classify_link(from, to, cleared, region, true, stats);
        if motion == MotionType::Cutting {
            cleared.record_move(from, to);
        }
        let path = vec![self.run.scaler.to_float(from), self.run.scaler.to_float(to)];
        reporter.push_segment(Segment::new(motion, path.clone()));
        self.push(motion, path);
        self.last_point = to;
    }

    /// Appends a cutting path, which must start at the last point
    pub fn append_cut(&mut self, path: &[IntPoint]) {
        let Some(last) = path.last().copied() else {
            return;
        };
        debug_assert!(
            path[0] == self.last_point,
            "cutting path does not continue the toolpath"
        );
        self.push(MotionType::Cutting, self.run.scaler.path_to_float(path));
        self.last_point = last;
    }

    /// Classifies the return to the start point and produces the output
    pub fn finish(
        self,
        cleared: &mut ClearedArea,
        region: &Region,
        stats: &mut RunStats,
    ) -> Option<AdaptiveOutput> {
        if self.segments.is_empty() {
            return None;
        }
        let return_motion = match self.last_point == self.start_point {
            true => MotionType::LinkClear,
            false => self.classify_link(
                self.last_point,
                self.start_point,
                cleared,
                region,
                false,
                stats,
            ),
        };
        Some(AdaptiveOutput {
            helix_center: self.run.scaler.to_float(self.helix_center),
            start_point: self.run.scaler.to_float(self.start_point),
            segments: self.segments,
            return_motion,
        })
    }

    /// Extends the last segment when it has the same motion and ends where `path` starts
    fn push(&mut self, motion: MotionType, path: Path) {
        match self.segments.last_mut() {
            Some(last) if last.motion == motion && last.path.last() == path.first() => {
                last.path.extend(path.into_iter().skip(1));
            }
            _ => self.segments.push(Segment::new(motion, path)),
        }
    }

    /// Classifies a link from `from` to `to`.
    ///
    /// The footprint at `to` is left out of the clearance tests, the pass starting there accounts for it.
    /// Links clear against the accumulator are `LinkClear` when the tool stays down, links clear against
    /// what was free before the first pass are `LinkClearAtPrevPass`, anything else is `LinkNotClear`.
    fn classify_link(
        &self,
        from: IntPoint,
        to: IntPoint,
        cleared: &mut ClearedArea,
        region: &Region,
        allow_cutting: bool,
        stats: &mut RunStats,
    ) -> MotionType {
        let r = self.run.tool_radius;
        let distance = from.distance(&to);
        let keep_tool_down = self.run.config.keep_tool_down;
        if allow_cutting
            && keep_tool_down
            && distance < 4.0 * r
            && self.can_cut_through(from, to, cleared, region)
        {
            trace!("[LINK] cutting through over {distance:.1}");
            return MotionType::Cutting;
        }
        let swept = clip::difference(&self.link_tool.stadium(from, to), &self.run.tool.disc(to));
        let center = IntPoint((from.0 + to.0) / 2, (from.1 + to.1) / 2);
        let reach = distance / 2.0 + r + 1.0;
        let is_clear =
            |covered: &IntRegion| clip::measure_difference(&swept, covered).area < CLEAR_LINK_AREA;
        let clear_now = is_clear(cleared.window(center, reach));
        if keep_tool_down && clear_now {
            MotionType::LinkClear
        } else if is_clear(&self.clear_at_start) {
            MotionType::LinkClearAtPrevPass
        } else {
            if !clear_now {
                stats.n_unclear_links += 1;
                debug!(
                    "[LINK] link over uncleared material, length {:.3}",
                    self.run.scaler.unscale(distance)
                );
            }
            MotionType::LinkNotClear
        }
    }

    /// Whether the tool can move straight from `from` to `to` while cutting,
    /// staying in the tool bound without overloading on any sub-step
    fn can_cut_through(
        &self,
        from: IntPoint,
        to: IntPoint,
        cleared: &mut ClearedArea,
        region: &Region,
    ) -> bool {
        let distance = from.distance(&to);
        let n_steps = (distance / self.run.max_step()).ceil().max(1.0) as usize;
        let step = distance / n_steps as f64;
        let dir = DirVec::between(from, to);
        let max_area = step * self.run.optimal_cut_area_pd * (1.0 + OVERLOAD_BOUND_FACTOR);
        let center = IntPoint((from.0 + to.0) / 2, (from.1 + to.1) / 2);
        let window = cleared.window(center, distance / 2.0 + self.run.tool_radius + 1.0);

        let mut a = from;
        (1..=n_steps).all(|i| {
            let b = match i == n_steps {
                true => to,
                false => from.translate(dir, i as f64 * step),
            };
            let ok = region_contains(&region.tool_bound, b)
                && calc_cut_area(&self.run.tool, window, a, b).area <= max_area;
            a = b;
            ok
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdaptiveConfig;
    use crate::engine::regions::decompose;
    use crate::geometry::primitives::{IntRect, Rect};
    use test_case::test_case;

    fn rect(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> IntRegion {
        clip::rect_region(&IntRect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Classifies a link from (500, 500) to `to` in a 4000 wide square region whose lower half is cleared,
    /// after starting with a helix at (500, 500)
    fn classify(keep_tool_down: bool, to: IntPoint) -> (MotionType, usize) {
        let config = AdaptiveConfig {
            tolerance: 0.2,
            keep_tool_down,
            ..AdaptiveConfig::default()
        };
        let run = RunState::new(&config, Rect::try_new(0.0, 0.0, 100.0, 100.0).ok());
        let stock = rect(0, 0, 4000, 4000);
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        let mut cleared = ClearedArea::new(&run.tool, rect(0, 0, 4000, 2000));
        let from = IntPoint(500, 500);
        let assembler = PassAssembler::new(&run, from, from, run.tool.disc(from));
        let mut stats = RunStats::default();
        let motion = assembler.classify_link(from, to, &mut cleared, region, true, &mut stats);
        (motion, stats.n_unclear_links)
    }

    #[test_case(true, IntPoint(3500, 500) => (MotionType::LinkClear, 0); "long link over cleared area")]
    #[test_case(true, IntPoint(600, 500) => (MotionType::Cutting, 0); "short link")]
    #[test_case(false, IntPoint(3500, 500) => (MotionType::LinkNotClear, 0); "tool lifted")]
    #[test_case(true, IntPoint(3500, 3500) => (MotionType::LinkNotClear, 1); "through uncleared material")]
    #[test_case(false, IntPoint(3500, 3500) => (MotionType::LinkNotClear, 1); "lifted through uncleared material")]
    #[test_case(true, IntPoint(500, 2000) => (MotionType::LinkClear, 0); "ending at the edge of the material")]
    fn link_classification(keep_tool_down: bool, to: IntPoint) -> (MotionType, usize) {
        classify(keep_tool_down, to)
    }

    #[test]
    fn uncut_stock_is_not_clear_at_the_previous_pass() {
        let config = AdaptiveConfig {
            tolerance: 0.2,
            ..AdaptiveConfig::default()
        };
        let run = RunState::new(&config, Rect::try_new(0.0, 0.0, 100.0, 100.0).ok());
        let stock = rect(0, 0, 4000, 4000);
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        let from = IntPoint(500, 500);
        let mut cleared = ClearedArea::new(&run.tool, run.tool.disc(from));
        let assembler = PassAssembler::new(&run, from, from, run.tool.disc(from));
        let mut stats = RunStats::default();
        let to = IntPoint(3500, 3500);
        let motion = assembler.classify_link(from, to, &mut cleared, region, true, &mut stats);
        assert_eq!(motion, MotionType::LinkNotClear);
        assert_eq!(stats.n_unclear_links, 1);
    }

    #[test]
    fn links_through_air_are_clear_at_the_previous_pass() {
        let config = AdaptiveConfig {
            tolerance: 0.2,
            ..AdaptiveConfig::default()
        };
        let run = RunState::new(&config, Rect::try_new(0.0, 0.0, 100.0, 100.0).ok());
        // two islands of stock, the link crosses the gap between them
        let stock = clip::union(&rect(0, 0, 1000, 1000), &rect(3000, 0, 4000, 1000));
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        let air = clip::difference(&rect(-1000, -1000, 5000, 2000), &stock);
        let (from, to) = (IntPoint(1000, 500), IntPoint(3000, 500));
        let around_ends = clip::union(&run.tool.disc(from), &run.tool.disc(to));
        let mut cleared = ClearedArea::new(&run.tool, around_ends.clone());
        let assembler = PassAssembler::new(&run, from, from, clip::union(&air, &around_ends));
        let mut stats = RunStats::default();
        let motion = assembler.classify_link(from, to, &mut cleared, region, true, &mut stats);
        assert_eq!(motion, MotionType::LinkClearAtPrevPass);
        assert_eq!(stats.n_unclear_links, 0);
    }

    #[test]
    fn links_leaving_the_region_are_not_clear() {
        let config = AdaptiveConfig {
            tolerance: 0.2,
            ..AdaptiveConfig::default()
        };
        let run = RunState::new(&config, Rect::try_new(0.0, 0.0, 100.0, 100.0).ok());
        // two islands of stock, the link crosses the gap between them
        let stock = clip::union(&rect(0, 0, 1000, 1000), &rect(3000, 0, 4000, 1000));
        let decomposition = decompose(&run, &stock, &clip::empty());
        let region = &decomposition.regions[0];
        let mut cleared = ClearedArea::new(&run.tool, clip::empty());
        let air = clip::difference(&rect(-1000, -1000, 5000, 2000), &stock);
        let assembler = PassAssembler::new(&run, IntPoint(500, 500), IntPoint(500, 500), air);
        let mut stats = RunStats::default();
        let (from, to) = (IntPoint(500, 500), IntPoint(3500, 500));
        let motion = assembler.classify_link(from, to, &mut cleared, region, true, &mut stats);
        assert_eq!(motion, MotionType::LinkNotClear);
        assert_eq!(stats.n_unclear_links, 1);
    }

    #[test]
    fn segments_are_merged() {
        let bbox = Rect::try_new(0.0, 0.0, 100.0, 100.0).ok();
        let run = RunState::new(&AdaptiveConfig::default(), bbox);
        let mut assembler = PassAssembler::new(&run, IntPoint(0, 0), IntPoint(0, 0), clip::empty());
        assembler.append_cut(&[IntPoint(0, 0), IntPoint(80, 0)]);
        assembler.append_cut(&[IntPoint(80, 0), IntPoint(160, 0)]);
        assert_eq!(assembler.segments.len(), 1);
        assert_eq!(assembler.segments[0].path.len(), 3);
        assert_eq!(assembler.last_point(), IntPoint(160, 0));
    }
}
