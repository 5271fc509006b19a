use crate::engine::consts::CLEARED_FLUSH_POINTS;
use crate::geometry::clip::{self, AreaMeasure};
use crate::geometry::footprint::Footprint;
use crate::geometry::primitives::{IntPath, IntPoint, IntRect, IntRegion};
use crate::util::assertions;

/// Material removed so far within one region.
///
/// Besides the full accumulator it keeps a window: the accumulator clipped to a square around the tool,
/// which is what cut area queries are evaluated against. Accepted moves are merged into the window
/// right away and into the full accumulator in batches.
pub struct ClearedArea<'a> {
    tool: &'a Footprint,
    full: IntRegion,
    /// Tool positions already merged into the window but not yet into `full`.
    /// After a flush the last position stays, so the next move continues the same sweep.
    pending: IntPath,
    dirty: bool,
    window: Option<Window>,
    /// Extra half-width added around a window request, so the window survives a few steps
    margin: i64,
}

/// State of a [`ClearedArea`] at some point of a region run
pub struct ClearedSnapshot {
    full: IntRegion,
    last: Option<IntPoint>,
}

struct Window {
    bounds: IntRect,
    region: IntRegion,
}

impl<'a> ClearedArea<'a> {
    pub fn new(tool: &'a Footprint, initial: IntRegion) -> Self {
        Self {
            tool,
            full: initial,
            pending: vec![],
            dirty: false,
            window: None,
            margin: (2.0 * tool.radius).ceil() as i64,
        }
    }

    /// The full accumulator, including all pending moves
    pub fn full(&mut self) -> &IntRegion {
        self.flush();
        &self.full
    }

    /// The tool arriving at `p` (outside of a cutting move) clears its footprint
    pub fn record_position(&mut self, p: IntPoint) {
        self.flush();
        self.pending.clear();
        self.pending.push(p);
        self.dirty = true;
        let disc = self.tool.disc(p);
        self.merge_into_window(&disc);
    }

    /// Commits an accepted straight move of the tool
    pub fn record_move(&mut self, from: IntPoint, to: IntPoint) {
        if self.pending.last() != Some(&from) {
            self.flush();
            self.pending.clear();
            self.pending.push(from);
        }
        self.pending.push(to);
        self.dirty = true;
        let stadium = self.tool.stadium(from, to);
        self.merge_into_window(&stadium);
        if self.pending.len() > CLEARED_FLUSH_POINTS {
            self.flush();
        }
    }

    /// Merges all pending moves into the full accumulator
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        let swept = self.tool.sweep(&self.pending);
        let merged = clip::union(&self.full, &swept);
        debug_assert!(assertions::cleared_area_grew(&self.full, &merged));
        debug_assert!(assertions::region_is_oriented(&merged));
        self.full = merged;
        self.pending.drain(..self.pending.len().saturating_sub(1));
        self.dirty = false;
    }

    /// Captures the accumulator, so moves recorded afterwards can be taken back with [`Self::restore`]
    pub fn snapshot(&mut self) -> ClearedSnapshot {
        self.flush();
        ClearedSnapshot {
            full: self.full.clone(),
            last: self.pending.last().copied(),
        }
    }

    /// Forgets every move recorded since `snapshot` was taken
    pub fn restore(&mut self, snapshot: ClearedSnapshot) {
        self.full = snapshot.full;
        self.pending = snapshot.last.into_iter().collect();
        self.dirty = false;
        self.window = None;
    }

    /// Cleared area around `center`, valid for queries reaching at most `reach` units away from it
    pub fn window(&mut self, center: IntPoint, reach: f64) -> &IntRegion {
        let needed = IntRect::around(center, reach.ceil() as i64 + 1);
        let window = match self.window.take() {
            Some(w) if w.bounds.contains(&needed) => w,
            _ => {
                self.flush();
                let bounds = needed.inflate(self.margin);
                let region = clip::intersection(&self.full, &clip::rect_region(&bounds));
                Window { bounds, region }
            }
        };
        &self.window.insert(window).region
    }

    fn merge_into_window(&mut self, covered: &IntRegion) {
        if let Some(w) = self.window.as_mut() {
            w.region = clip::union(&w.region, covered);
        }
    }
}

/// Material newly removed by moving the tool from `from` to `to`.
/// A pure query against `cleared`, which must contain the tool footprint at `from`.
pub fn calc_cut_area(tool: &Footprint, cleared: &IntRegion, from: IntPoint, to: IntPoint) -> AreaMeasure {
    match from == to {
        true => AreaMeasure::ZERO,
        false => clip::measure_difference(&tool.stadium(from, to), cleared),
    }
}

/// Uncleared material under the tool footprint at `p`
pub fn engagement_at(tool: &Footprint, cleared: &IntRegion, p: IntPoint) -> f64 {
    clip::measure_difference(&tool.disc(p), cleared).area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path_utils::region_area;
    use std::f64::consts::PI;

    #[test]
    fn straight_cut_into_fresh_material() {
        let tool = Footprint::new(100.0);
        let mut cleared = ClearedArea::new(&tool, clip::empty());
        cleared.record_position(IntPoint(0, 0));
        let window = cleared.window(IntPoint(0, 0), 150.0);
        let cut = calc_cut_area(&tool, window, IntPoint(0, 0), IntPoint(50, 0));
        // a move of d into fresh material removes roughly 2 R d
        assert!((cut.area - 2.0 * 100.0 * 50.0).abs() < 0.05 * 2.0 * 100.0 * 50.0);
        // the new material lies ahead of the tool
        assert!(cut.centroid.unwrap().0 > 0.0);
    }

    #[test]
    fn window_and_full_agree() {
        let tool = Footprint::new(100.0);
        let mut cleared = ClearedArea::new(&tool, clip::empty());
        cleared.record_position(IntPoint(0, 0));
        let _ = cleared.window(IntPoint(0, 0), 150.0);
        let mut from = IntPoint(0, 0);
        for i in 1..=30 {
            let to = IntPoint(i * 20, 0);
            cleared.record_move(from, to);
            from = to;
        }
        let expected = 600.0 * 200.0 + PI * 100.0 * 100.0;
        let full_area = region_area(cleared.full());
        assert!((full_area - expected).abs() < 0.02 * expected);

        // the swept area is cleared, so moving back along it removes nothing
        let window = cleared.window(IntPoint(300, 0), 150.0);
        let cut = calc_cut_area(&tool, window, IntPoint(300, 0), IntPoint(280, 0));
        assert!(cut.area < 1.0);
    }

    #[test]
    fn queries_do_not_mutate() {
        let tool = Footprint::new(50.0);
        let mut cleared = ClearedArea::new(&tool, tool.disc(IntPoint(0, 0)));
        let before = region_area(cleared.full());
        let window = cleared.window(IntPoint(0, 0), 100.0).clone();
        let _ = calc_cut_area(&tool, &window, IntPoint(0, 0), IntPoint(30, 0));
        let _ = engagement_at(&tool, &window, IntPoint(60, 0));
        assert_eq!(region_area(cleared.full()), before);
    }

    #[test]
    fn restore_takes_back_later_moves() {
        let tool = Footprint::new(50.0);
        let mut cleared = ClearedArea::new(&tool, clip::empty());
        cleared.record_position(IntPoint(0, 0));
        cleared.record_move(IntPoint(0, 0), IntPoint(100, 0));
        let snapshot = cleared.snapshot();
        let before = region_area(cleared.full());

        for i in 1..=20 {
            cleared.record_move(IntPoint(100, 20 * (i - 1)), IntPoint(100, 20 * i));
        }
        assert!(region_area(cleared.full()) > before + 300.0 * 100.0);
        let window = cleared.window(IntPoint(100, 200), 100.0);
        assert!(engagement_at(&tool, window, IntPoint(100, 200)) < 1.0);

        cleared.restore(snapshot);
        assert_eq!(region_area(cleared.full()), before);
        // the window is rebuilt from the restored accumulator
        let window = cleared.window(IntPoint(100, 200), 100.0);
        let disc = region_area(&tool.disc(IntPoint(0, 0)));
        assert!((engagement_at(&tool, window, IntPoint(100, 200)) - disc).abs() < 1.0);
    }
}
