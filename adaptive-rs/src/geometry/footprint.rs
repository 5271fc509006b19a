use std::f64::consts::PI;

use crate::geometry::clip;
use crate::geometry::convex_hull::convex_hull_from_points;
use crate::geometry::primitives::{IntPoint, IntRegion};

/// Smallest vertex count used to discretize a circle
const MIN_CIRCLE_VERTICES: usize = 8;
/// Largest vertex count used to discretize a circle
const MAX_CIRCLE_VERTICES: usize = 1024;

/// Circular footprint discretized on the scaled grid.
/// The polygon is inscribed in the circle and deviates from it by at most one grid unit.
#[derive(Debug, Clone)]
pub struct Footprint {
    pub radius: f64,
    /// Vertices relative to the center, counter-clockwise
    offsets: Vec<IntPoint>,
}

impl Footprint {
    pub fn new(radius: f64) -> Self {
        let n = circle_vertex_count(radius);
        let mut offsets = (0..n)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / n as f64;
                IntPoint(
                    (radius * angle.cos()).round() as i64,
                    (radius * angle.sin()).round() as i64,
                )
            })
            .collect::<Vec<_>>();
        offsets.dedup();
        Self { radius, offsets }
    }

    /// Footprint ring centered at `center`
    pub fn ring_at(&self, center: IntPoint) -> Vec<IntPoint> {
        self.offsets.iter().map(|o| *o + center).collect()
    }

    pub fn disc(&self, center: IntPoint) -> IntRegion {
        clip::region_from_ring(&self.ring_at(center))
    }

    /// Area covered by the footprint moving in a straight line from `a` to `b`
    pub fn stadium(&self, a: IntPoint, b: IntPoint) -> IntRegion {
        match a == b {
            true => self.disc(a),
            false => {
                let mut points = self.ring_at(a);
                points.extend(self.ring_at(b));
                clip::convex_region(convex_hull_from_points(points))
            }
        }
    }

    /// Area covered by the footprint following an open path
    pub fn sweep(&self, path: &[IntPoint]) -> IntRegion {
        match path {
            [] => clip::empty(),
            [p] => self.disc(*p),
            _ => clip::union_all(
                path.windows(2)
                    .map(|w| self.stadium(w[0], w[1]))
                    .collect(),
            ),
        }
    }
}

/// Vertex count keeping the sagitta of an inscribed polygon below one grid unit
fn circle_vertex_count(radius: f64) -> usize {
    match radius > 1.0 {
        true => {
            let n = (PI / (1.0 - 1.0 / radius).acos()).ceil() as usize;
            n.clamp(MIN_CIRCLE_VERTICES, MAX_CIRCLE_VERTICES)
        }
        false => MIN_CIRCLE_VERTICES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path_utils::region_area;
    use test_case::test_case;

    #[test_case(100.0; "radius 100")]
    #[test_case(12.5; "radius 12.5")]
    #[test_case(1000.0; "radius 1000")]
    fn disc_area_close_to_circle(radius: f64) {
        let fp = Footprint::new(radius);
        let area = region_area(&fp.disc(IntPoint(0, 0)));
        let circle = PI * radius * radius;
        // the inscribed polygon loses at most a one unit wide band along the circumference
        assert!(area <= circle + 2.0 * PI * radius);
        assert!(area >= circle - 2.0 * PI * (radius + 1.0));
    }

    #[test]
    fn stadium_area() {
        let fp = Footprint::new(100.0);
        let disc = region_area(&fp.disc(IntPoint(0, 0)));
        let stadium = region_area(&fp.stadium(IntPoint(0, 0), IntPoint(300, 0)));
        // rectangle of 300 x 200 between the two half discs
        assert!((stadium - disc - 300.0 * 200.0).abs() < 300.0 * 2.0);
    }

    #[test]
    fn sweep_of_single_point_is_disc() {
        let fp = Footprint::new(50.0);
        let p = IntPoint(7, -3);
        assert_eq!(fp.sweep(&[p]), fp.disc(p));
    }
}
