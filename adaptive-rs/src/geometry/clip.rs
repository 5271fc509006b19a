//! Boolean operations on scaled regions.
//!
//! Every operation runs the `geo` boolean engine over the integer coordinates (exactly representable
//! as `f64`) and snaps the result back onto the grid. Snapped rings with fewer than three distinct
//! vertices or no area are dropped, outer rings are made counter-clockwise and holes clockwise.

use geo::{Area, BooleanOps, Centroid, MapCoords};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};

use crate::geometry::path_utils::ring_signed_area;
use crate::geometry::primitives::{IntPoint, IntRect, IntRegion, Point};

pub fn empty() -> IntRegion {
    MultiPolygon::new(vec![])
}

pub fn is_empty(region: &IntRegion) -> bool {
    region.0.is_empty()
}

/// Region enclosed by a single ring, regardless of the ring's orientation
pub fn region_from_ring(ring: &[IntPoint]) -> IntRegion {
    match snap_ring(ring.to_vec(), true) {
        Some(r) => MultiPolygon::new(vec![Polygon::new(LineString::from(r), vec![])]),
        None => empty(),
    }
}

/// Convex region spanned by `ring`, which must already be convex and counter-clockwise
pub(crate) fn convex_region(ring: Vec<IntPoint>) -> IntRegion {
    match ring.len() >= 3 {
        true => MultiPolygon::new(vec![Polygon::new(LineString::from(ring), vec![])]),
        false => empty(),
    }
}

pub fn rect_region(rect: &IntRect) -> IntRegion {
    convex_region(rect.corners().to_vec())
}

pub fn union(a: &IntRegion, b: &IntRegion) -> IntRegion {
    match (is_empty(a), is_empty(b)) {
        (true, _) => b.clone(),
        (_, true) => a.clone(),
        _ => snap(&to_float(a).union(&to_float(b))),
    }
}

pub fn difference(a: &IntRegion, b: &IntRegion) -> IntRegion {
    match (is_empty(a), is_empty(b)) {
        (true, _) => empty(),
        (_, true) => a.clone(),
        _ => snap(&to_float(a).difference(&to_float(b))),
    }
}

pub fn intersection(a: &IntRegion, b: &IntRegion) -> IntRegion {
    match is_empty(a) || is_empty(b) {
        true => empty(),
        false => snap(&to_float(a).intersection(&to_float(b))),
    }
}

pub fn xor(a: &IntRegion, b: &IntRegion) -> IntRegion {
    match (is_empty(a), is_empty(b)) {
        (true, _) => b.clone(),
        (_, true) => a.clone(),
        _ => snap(&to_float(a).xor(&to_float(b))),
    }
}

/// Union of many regions, merged pairwise so every operand stays small
pub fn union_all(mut parts: Vec<IntRegion>) -> IntRegion {
    parts.retain(|p| !is_empty(p));
    while parts.len() > 1 {
        let mut merged = Vec::with_capacity(parts.len() / 2 + 1);
        let mut iter = parts.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => merged.push(union(&a, &b)),
                None => merged.push(a),
            }
        }
        parts = merged;
    }
    parts.pop().unwrap_or_else(empty)
}

/// Area and centroid of `a \ b`, measured before snapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaMeasure {
    pub area: f64,
    /// Centroid in scaled coordinates, `None` when nothing remains
    pub centroid: Option<Point>,
}

impl AreaMeasure {
    pub const ZERO: AreaMeasure = AreaMeasure {
        area: 0.0,
        centroid: None,
    };
}

pub fn measure_difference(a: &IntRegion, b: &IntRegion) -> AreaMeasure {
    if is_empty(a) {
        return AreaMeasure::ZERO;
    }
    let rest = match is_empty(b) {
        true => to_float(a),
        false => to_float(a).difference(&to_float(b)),
    };
    AreaMeasure {
        area: rest.unsigned_area(),
        centroid: rest.centroid().map(|c| Point(c.x(), c.y())),
    }
}

fn to_float(region: &IntRegion) -> MultiPolygon<f64> {
    region.map_coords(|c| Coord {
        x: c.x as f64,
        y: c.y as f64,
    })
}

fn snap(region: &MultiPolygon<f64>) -> IntRegion {
    let polygons = region
        .0
        .iter()
        .filter_map(|poly| {
            let exterior = snap_ring(grid_points(poly.exterior()), true)?;
            let holes = poly
                .interiors()
                .iter()
                .filter_map(|h| snap_ring(grid_points(h), false))
                .map(LineString::from)
                .collect();
            Some(Polygon::new(LineString::from(exterior), holes))
        })
        .collect();
    MultiPolygon::new(polygons)
}

fn grid_points(ls: &LineString<f64>) -> Vec<IntPoint> {
    ls.coords()
        .map(|c| IntPoint(c.x.round() as i64, c.y.round() as i64))
        .collect()
}

/// Removes duplicate vertices and orients the ring, `None` if nothing with an area remains
fn snap_ring(mut ring: Vec<IntPoint>, ccw: bool) -> Option<Vec<IntPoint>> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return None;
    }
    let area = ring_signed_area(&ring);
    if area == 0.0 {
        return None;
    }
    if (area > 0.0) != ccw {
        ring.reverse();
    }
    Some(ring)
}
