use log::warn;

use crate::engine::consts::{MAX_SCALED_COORD, RESOLUTION_FACTOR};
use crate::geometry::clip;
use crate::geometry::primitives::{IntPath, IntPoint, IntRegion, Path, PathSet, Point, Rect};
use crate::util::assertions;

/// Maps user coordinates onto the scaled integer grid of a run and back.
/// One grid unit corresponds to at most `tolerance / RESOLUTION_FACTOR` user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaler {
    pub scale_factor: f64,
}

impl Scaler {
    /// * `bbox` - bounding box of all input geometry
    /// * `margin` - distance the geometry may grow beyond `bbox` during the run (offsets, overshoot)
    pub fn new(
        bbox: Option<Rect>,
        margin: f64,
        tolerance: f64,
        tool_diameter: f64,
        step_over_factor: f64,
    ) -> Self {
        let mut scale_factor = RESOLUTION_FACTOR / tolerance;
        let step_over = step_over_factor * tool_diameter;
        if step_over < 1.0 {
            // tiny step-overs need a finer grid than the tolerance alone asks for
            scale_factor /= step_over;
        }
        let span = bbox.map_or(0.0, |b| b.max_abs_coord()) + margin;
        let span = span.max(tolerance);
        if span * scale_factor > MAX_SCALED_COORD {
            let capped = MAX_SCALED_COORD / span;
            warn!(
                "[NORM] scale factor reduced from {scale_factor:.3} to {capped:.3} to keep coordinates in range"
            );
            scale_factor = capped;
        }
        Self { scale_factor }
    }

    pub fn scale(&self, v: f64) -> f64 {
        v * self.scale_factor
    }

    pub fn unscale(&self, v: f64) -> f64 {
        v / self.scale_factor
    }

    pub fn unscale_area(&self, a: f64) -> f64 {
        a / (self.scale_factor * self.scale_factor)
    }

    pub fn to_int(&self, p: Point) -> IntPoint {
        IntPoint(
            (p.0 * self.scale_factor).round() as i64,
            (p.1 * self.scale_factor).round() as i64,
        )
    }

    pub fn to_float(&self, p: IntPoint) -> Point {
        Point(p.0 as f64 / self.scale_factor, p.1 as f64 / self.scale_factor)
    }

    pub fn path_to_int(&self, path: &[Point]) -> IntPath {
        path.iter().map(|p| self.to_int(*p)).collect()
    }

    pub fn path_to_float(&self, path: &[IntPoint]) -> Path {
        path.iter().map(|p| self.to_float(*p)).collect()
    }

    /// Scaled region enclosed by a set of rings under the even-odd rule.
    /// Paths with fewer than three points are ignored.
    pub fn region_from_paths(&self, paths: &PathSet) -> IntRegion {
        debug_assert!(paths.iter().flatten().all(|p| {
            assertions::round_trip_within_resolution(self, *p, 1.0 / self.scale_factor)
        }));
        paths
            .iter()
            .filter(|p| p.len() >= 3)
            .map(|p| clip::region_from_ring(&self.path_to_int(p)))
            .fold(clip::empty(), |acc, r| clip::xor(&acc, &r))
    }
}

/// Bounding box over every point of the given path sets
pub fn bounding_box(sets: &[&PathSet]) -> Option<Rect> {
    Rect::bounding(sets.iter().flat_map(|s| s.iter().flatten().copied()))
}
