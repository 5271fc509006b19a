use itertools::Itertools;

use crate::geometry::clip;
use crate::geometry::footprint::Footprint;
use crate::geometry::path_utils::rings;
use crate::geometry::primitives::IntRegion;

/// Offsets a region by `delta` grid units with round joins: outwards for positive values, inwards for negative ones.
/// Computed as the Minkowski sum (or difference) of the region with a disc: the discs swept along every
/// ring edge are merged and added to (or removed from) the region.
pub fn offset_region(region: &IntRegion, delta: f64) -> IntRegion {
    let radius = delta.abs();
    if radius < 0.5 || clip::is_empty(region) {
        return region.clone();
    }
    let disc = Footprint::new(radius);
    let edge_covers = rings(region)
        .iter()
        .flat_map(|ring| {
            ring.iter()
                .circular_tuple_windows()
                .map(|(a, b)| disc.stadium(*a, *b))
                .collect_vec()
        })
        .collect_vec();
    let cover = clip::union_all(edge_covers);
    match delta > 0.0 {
        true => clip::union(region, &cover),
        false => clip::difference(region, &cover),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path_utils::region_area;
    use crate::geometry::primitives::IntRect;
    use std::f64::consts::PI;

    fn square(size: i64) -> IntRegion {
        clip::rect_region(&IntRect {
            x_min: 0,
            y_min: 0,
            x_max: size,
            y_max: size,
        })
    }

    #[test]
    fn inward_offset_shrinks_square() {
        let shrunk = offset_region(&square(1000), -100.0);
        let area = region_area(&shrunk);
        // 800 x 800 with at most one grid unit of error along the boundary
        assert!((area - 800.0 * 800.0).abs() < 4.0 * 800.0 * 1.5);
    }

    #[test]
    fn outward_offset_rounds_corners() {
        let grown = offset_region(&square(1000), 100.0);
        let area = region_area(&grown);
        let expected = 1000.0 * 1000.0 + 4.0 * 1000.0 * 100.0 + PI * 100.0 * 100.0;
        assert!((area - expected).abs() < 0.01 * expected);
    }

    #[test]
    fn region_vanishes_when_too_thin() {
        assert!(clip::is_empty(&offset_region(&square(150), -100.0)));
    }
}
