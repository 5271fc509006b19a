//Various checks to verify correctness of the state of the engine
//Used in debug_assert!() blocks

use float_cmp::approx_eq;
use log::error;

use crate::geometry::path_utils::{open_ring, region_area, ring_signed_area};
use crate::geometry::primitives::{IntRegion, Point};
use crate::geometry::scaling::Scaler;

/// Scaling `p` onto the grid and back moves it by no more than `tolerance`
pub fn round_trip_within_resolution(scaler: &Scaler, p: Point, tolerance: f64) -> bool {
    let back = scaler.to_float(scaler.to_int(p));
    let d = p.distance(&back);
    d <= tolerance || approx_eq!(f64, d, tolerance, ulps = 4)
}

/// Outer rings are counter-clockwise, holes clockwise and none of them is degenerate
pub fn region_is_oriented(region: &IntRegion) -> bool {
    region.0.iter().all(|poly| {
        let exterior_ok = ring_signed_area(&open_ring(poly.exterior())) > 0.0;
        let holes_ok = poly
            .interiors()
            .iter()
            .all(|h| ring_signed_area(&open_ring(h)) < 0.0);
        if !(exterior_ok && holes_ok) {
            error!("badly oriented polygon: {poly:?}");
        }
        exterior_ok && holes_ok
    })
}

/// The cleared area never shrinks, up to grid snapping along its boundary
pub fn cleared_area_grew(before: &IntRegion, after: &IntRegion) -> bool {
    let (a_before, a_after) = (region_area(before), region_area(after));
    // snapping a merged boundary can shave off up to a unit per vertex
    let slack = before.0.iter().map(|p| p.exterior().0.len()).sum::<usize>() as f64;
    a_after + slack >= a_before || approx_eq!(f64, a_after + slack, a_before, ulps = 4)
}
