use std::f64::consts::FRAC_PI_2;

use log::trace;

use crate::engine::cleared::{ClearedArea, engagement_at};
use crate::engine::consts::{AREA_ERROR_FACTOR, ENGAGE_MAX_LAPS, NTOL};
use crate::geometry::footprint::Footprint;
use crate::geometry::path_utils::{closest_on_rings, region_contains};
use crate::geometry::primitives::{DirVec, IntPath, IntPoint, IntRegion};

/// Cursor walking along a set of closed rings, used to find where the next pass can engage the material.
/// Rings are walked in their stored order, callers orient them so the material lies on the right.
/// The tool position under the cursor can be shifted to the left of the ring by an inset.
#[derive(Debug, Clone)]
pub struct EngageWalker {
    paths: Vec<IntPath>,
    path_idx: usize,
    segment_idx: usize,
    /// Distance travelled along the current segment
    segment_pos: f64,
    /// Distance travelled along the current path since entering it
    travelled: f64,
    path_length: f64,
    total_length: f64,
    /// Distance walked by [`Self::next_engage_point`] since the cursor was last placed
    walked: f64,
    inset: f64,
}

impl EngageWalker {
    /// Rings with fewer than two distinct points are ignored
    pub fn new(paths: Vec<IntPath>) -> Self {
        let paths = paths
            .into_iter()
            .map(|mut p| {
                p.dedup();
                while p.len() > 1 && p.first() == p.last() {
                    p.pop();
                }
                p
            })
            .filter(|p| p.len() > 1)
            .collect::<Vec<_>>();
        let path_length = paths.first().map_or(0.0, |p| ring_length(p));
        let total_length = paths.iter().map(|p| ring_length(p)).sum();
        Self {
            paths,
            path_idx: 0,
            segment_idx: 0,
            segment_pos: 0.0,
            travelled: 0.0,
            path_length,
            total_length,
            walked: 0.0,
            inset: 0.0,
        }
    }

    /// Places the tool `inset` units left of the rings
    pub fn with_inset(mut self, inset: f64) -> Self {
        self.inset = inset;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn segment(&self) -> (IntPoint, IntPoint) {
        let path = &self.paths[self.path_idx];
        (
            path[self.segment_idx],
            path[(self.segment_idx + 1) % path.len()],
        )
    }

    pub fn current_point(&self) -> IntPoint {
        if self.is_empty() {
            return IntPoint(0, 0);
        }
        let (a, b) = self.segment();
        let length = a.distance(&b);
        match length > NTOL {
            true => a.translate(DirVec::between(a, b), self.segment_pos),
            false => a,
        }
    }

    /// Tool position for the cursor, the current point shifted by the inset
    pub fn tool_point(&self) -> IntPoint {
        match self.inset > NTOL {
            true => self
                .current_point()
                .translate(self.current_dir().rotate(FRAC_PI_2), self.inset),
            false => self.current_point(),
        }
    }

    /// Direction of the segment under the cursor
    pub fn current_dir(&self) -> DirVec {
        if self.is_empty() {
            return DirVec(1.0, 0.0);
        }
        let (a, b) = self.segment();
        DirVec::between(a, b).normalized()
    }

    /// Advances the cursor by `distance` along the current ring.
    /// Returns false once a full lap of the ring has been completed.
    pub fn move_forward(&mut self, distance: f64) -> bool {
        if self.is_empty() || distance < NTOL {
            return false;
        }
        let mut remaining = distance;
        loop {
            let (a, b) = self.segment();
            let length = a.distance(&b);
            if self.segment_pos + remaining <= length {
                self.segment_pos += remaining;
                break;
            }
            remaining -= length - self.segment_pos;
            self.segment_pos = 0.0;
            self.segment_idx = (self.segment_idx + 1) % self.paths[self.path_idx].len();
        }
        self.travelled += distance;
        self.travelled < self.path_length
    }

    /// Moves the cursor to the start of the next ring.
    /// Returns false when it wraps around to the first ring.
    pub fn next_path(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.path_idx = (self.path_idx + 1) % self.paths.len();
        self.segment_idx = 0;
        self.segment_pos = 0.0;
        self.travelled = 0.0;
        self.path_length = ring_length(&self.paths[self.path_idx]);
        self.path_idx != 0
    }

    /// Puts the cursor at the point on any ring closest to `p`, restarting the lap count from there
    pub fn move_to_closest_point(&mut self, p: IntPoint) {
        if let Some(loc) = closest_on_rings(&self.paths, p) {
            self.path_idx = loc.ring;
            self.segment_idx = loc.segment;
            let (a, b) = self.segment();
            self.segment_pos = loc.t * a.distance(&b);
            self.travelled = 0.0;
            self.walked = 0.0;
            self.path_length = ring_length(&self.paths[self.path_idx]);
        }
    }

    /// Walks forward in steps of `step` until the uncleared material under the tool at [`Self::tool_point`]
    /// lies within `area_range` and is not falling. Tool positions outside `bound` are skipped.
    ///
    /// The walked distance accumulates over calls until the cursor is placed again, the search gives up
    /// once it exceeds [`ENGAGE_MAX_LAPS`] laps over all rings.
    pub fn next_engage_point(
        &mut self,
        cleared: &mut ClearedArea,
        tool: &Footprint,
        step: f64,
        area_range: (f64, f64),
        bound: Option<&IntRegion>,
    ) -> bool {
        if self.is_empty() || step < NTOL {
            return false;
        }
        let (min_area, max_area) = area_range;
        let reach = tool.radius + 1.0;
        let engagement = |cleared: &mut ClearedArea, p: IntPoint| match bound {
            Some(b) if !region_contains(b, p) => 0.0,
            _ => engagement_at(tool, cleared.window(p, reach), p),
        };
        let mut prev_area = engagement(cleared, self.tool_point());
        let budget = ENGAGE_MAX_LAPS as f64 * self.total_length;
        loop {
            if !self.move_forward(step) {
                self.next_path();
            }
            self.walked += step;
            if self.walked > budget {
                trace!("[ENGAGE] no engage point after {:.0}", self.walked);
                return false;
            }
            let p = self.tool_point();
            let area = engagement(cleared, p);
            if area > min_area && area < max_area && area > prev_area * (1.0 - AREA_ERROR_FACTOR) {
                trace!("[ENGAGE] engage point at {p:?}, area {area:.1}");
                return true;
            }
            prev_area = area;
        }
    }
}

fn ring_length(ring: &[IntPoint]) -> f64 {
    (0..ring.len())
        .map(|i| ring[i].distance(&ring[(i + 1) % ring.len()]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::clip;
    use crate::geometry::path_utils::rings;
    use crate::geometry::primitives::IntRect;

    fn square(size: i64) -> IntPath {
        vec![
            IntPoint(0, 0),
            IntPoint(size, 0),
            IntPoint(size, size),
            IntPoint(0, size),
        ]
    }

    #[test]
    fn walks_around_a_ring() {
        let mut walker = EngageWalker::new(vec![square(100)]);
        assert!(walker.move_forward(150.0));
        assert_eq!(walker.current_point(), IntPoint(100, 50));
        assert_eq!(walker.current_dir(), DirVec(0.0, 1.0));
        assert!(walker.move_forward(200.0));
        assert_eq!(walker.current_point(), IntPoint(0, 50));
        // completes the lap
        assert!(!walker.move_forward(100.0));
        assert_eq!(walker.current_point(), IntPoint(50, 0));
    }

    #[test]
    fn next_path_wraps() {
        let mut walker = EngageWalker::new(vec![square(100), square(10), vec![IntPoint(3, 3)]]);
        assert!(walker.next_path());
        assert_eq!(walker.current_point(), IntPoint(0, 0));
        assert!(!walker.next_path());
    }

    #[test]
    fn closest_point_is_projected() {
        let mut walker = EngageWalker::new(vec![square(100)]);
        walker.move_to_closest_point(IntPoint(130, 70));
        assert_eq!(walker.current_point(), IntPoint(100, 70));
        assert_eq!(walker.current_dir(), DirVec(0.0, 1.0));
    }

    #[test]
    fn finds_the_edge_of_the_cleared_area() {
        let tool = Footprint::new(20.0);
        // left half of the plane is cleared
        let initial = clip::rect_region(&IntRect {
            x_min: -1000,
            y_min: -1000,
            x_max: 500,
            y_max: 1000,
        });
        let mut cleared = ClearedArea::new(&tool, initial);
        let mut walker = EngageWalker::new(vec![vec![
            IntPoint(0, 0),
            IntPoint(1000, 0),
            IntPoint(1000, 1000),
            IntPoint(0, 1000),
        ]]);
        let disc = std::f64::consts::PI * 400.0;
        assert!(walker.next_engage_point(&mut cleared, &tool, 5.0, (0.1 * disc, 0.9 * disc), None));
        let p = walker.current_point();
        assert_eq!(p.1, 0);
        assert!(p.0 > 480 && p.0 < 520);
    }

    #[test]
    fn gives_up_when_everything_is_cleared() {
        let tool = Footprint::new(20.0);
        let initial = clip::rect_region(&IntRect {
            x_min: -100,
            y_min: -100,
            x_max: 200,
            y_max: 200,
        });
        let mut cleared = ClearedArea::new(&tool, initial);
        let mut walker = EngageWalker::new(vec![square(100)]);
        assert!(!walker.next_engage_point(&mut cleared, &tool, 5.0, (10.0, 1000.0), None));
    }

    #[test]
    fn inset_tool_engages_one_step_over_into_the_material() {
        let tool = Footprint::new(100.0);
        // cleared square, the walker follows its boundary with the material on the right
        let initial = clip::rect_region(&IntRect {
            x_min: 0,
            y_min: 0,
            x_max: 2000,
            y_max: 2000,
        });
        let mut cleared = ClearedArea::new(&tool, initial.clone());
        let mut walker = EngageWalker::new(rings(&initial)).with_inset(60.0);
        walker.move_to_closest_point(IntPoint(1000, 0));
        let bound = clip::rect_region(&IntRect {
            x_min: 100,
            y_min: 0,
            x_max: 1900,
            y_max: 1900,
        });
        let disc = std::f64::consts::PI * 100.0 * 100.0;
        let range = (0.05 * disc, 0.5 * disc);
        assert!(walker.next_engage_point(&mut cleared, &tool, 20.0, range, Some(&bound)));
        let p = walker.tool_point();
        assert_eq!(p.1, 60);
        assert!(p.0 > 1000 && p.0 < 1100);
        assert_eq!(walker.current_dir(), DirVec(1.0, 0.0));
        let area = engagement_at(&tool, cleared.window(p, 101.0), p);
        // circular segment 40 deep
        assert!((area - 4473.0).abs() < 0.05 * 4473.0);
    }

    #[test]
    fn search_budget_spans_calls() {
        let tool = Footprint::new(20.0);
        let mut cleared = ClearedArea::new(&tool, clip::empty());
        let mut walker = EngageWalker::new(vec![square(100)]);
        let disc = std::f64::consts::PI * 400.0;
        // every position engages, each call accepts after one step
        let mut n_found = 0;
        while walker.next_engage_point(&mut cleared, &tool, 10.0, (0.5 * disc, 2.0 * disc), None) {
            n_found += 1;
            assert!(n_found <= 100);
        }
        assert_eq!(n_found, ENGAGE_MAX_LAPS * 40);
    }
}
