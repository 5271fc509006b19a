use std::collections::VecDeque;

use crate::geometry::path_utils::{closest_on_segment, region_contains, rings};
use crate::geometry::primitives::{IntPath, IntPoint, IntRect, IntRegion, Point, Rect};

const MAX_POI_TREE_DEPTH: usize = 10;

/// Deepest point of a region: the interior point farthest from any of its rings (holes included).
/// Returns the point (snapped to the grid) and its distance to the nearest ring.
pub fn pole_of_inaccessibility(region: &IntRegion) -> Option<(IntPoint, f64)> {
    //Based on Mapbox's "Polylabel" algorithm: <https://github.com/mapbox/polylabel>
    let rings = rings(region);
    let square_bbox = IntRect::bounding(rings.iter().flatten())?
        .as_rect()?
        .inflate_to_square();
    let root = POINode::new(square_bbox, MAX_POI_TREE_DEPTH, region, &rings);
    let mut queue = VecDeque::from([root]);
    let mut best: Option<(IntPoint, f64)> = None;
    let distance = |best: &Option<(IntPoint, f64)>| best.map_or(0.0, |(_, d)| d);

    while let Some(node) = queue.pop_front() {
        //check if better than current best
        if node.distance > distance(&best) {
            best = Some((node.center, node.distance));
        }

        //see if worth it to split
        if node.distance_upperbound() > distance(&best) {
            if let Some(children) = node.split(region, &rings) {
                queue.extend(children);
            }
        }
    }
    best
}

struct POINode {
    pub level: usize,
    pub bbox: Rect,
    pub center: IntPoint,
    pub radius: f64,
    pub distance: f64,
}

impl POINode {
    fn new(bbox: Rect, level: usize, region: &IntRegion, rings: &[IntPath]) -> Self {
        let radius = bbox.diameter() / 2.0;
        let Point(cx, cy) = bbox.centroid();
        let center = IntPoint(cx.round() as i64, cy.round() as i64);

        let distance = {
            let distance_to_border = rings
                .iter()
                .flat_map(|ring| {
                    (0..ring.len()).map(move |i| {
                        closest_on_segment(center, ring[i], ring[(i + 1) % ring.len()]).1
                    })
                })
                .fold(f64::MAX, f64::min)
                .sqrt();

            //if the center is outside, distance is counted negative
            match region_contains(region, center) {
                true => distance_to_border,
                false => -distance_to_border,
            }
        };

        Self {
            level,
            bbox,
            center,
            radius,
            distance,
        }
    }

    fn split(&self, region: &IntRegion, rings: &[IntPath]) -> Option<[POINode; 4]> {
        match self.level {
            0 => None,
            _ => Some(
                self.bbox
                    .quadrants()
                    .map(|qd| POINode::new(qd, self.level - 1, region, rings)),
            ),
        }
    }

    fn distance_upperbound(&self) -> f64 {
        self.radius + self.distance
    }
}
