use std::collections::VecDeque;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::geometry::primitives::{DirVec, IntPath, IntPoint, IntRegion};

/// Location of a point relative to a closed ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingPosition {
    Outside,
    Inside,
    OnBoundary,
}

/// Signed area of an (open) ring, positive for counter-clockwise rings
pub fn ring_signed_area(ring: &[IntPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice_area: i128 = ring
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.0 as i128 * b.1 as i128 - b.0 as i128 * a.1 as i128)
        .sum();
    twice_area as f64 / 2.0
}

/// Area enclosed by a region, holes excluded
pub fn region_area(region: &IntRegion) -> f64 {
    region
        .0
        .iter()
        .map(|p| {
            let outer = ring_signed_area(&open_ring(p.exterior())).abs();
            let holes: f64 = p
                .interiors()
                .iter()
                .map(|h| ring_signed_area(&open_ring(h)).abs())
                .sum();
            outer - holes
        })
        .sum()
}

/// Converts a closed [`geo_types::LineString`] into an open ring
pub fn open_ring(ls: &geo_types::LineString<i64>) -> IntPath {
    let mut ring: IntPath = ls.coords().map(|c| IntPoint::from(*c)).collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// All rings (outer boundaries and holes) of a region, in polygon order
pub fn rings(region: &IntRegion) -> Vec<IntPath> {
    region
        .0
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
        .map(open_ring)
        .filter(|r| r.len() > 1)
        .collect()
}

/// Crossing number test with exact integer arithmetic
pub fn point_in_ring(p: IntPoint, ring: &[IntPoint]) -> RingPosition {
    if ring.len() < 3 {
        return RingPosition::Outside;
    }
    let mut inside = false;
    for (a, b) in ring.iter().circular_tuple_windows() {
        let cross = (b.0 - a.0) as i128 * (p.1 - a.1) as i128 - (b.1 - a.1) as i128 * (p.0 - a.0) as i128;
        let within_x = p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0);
        let within_y = p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1);
        if cross == 0 && within_x && within_y {
            return RingPosition::OnBoundary;
        }
        if (a.1 > p.1) != (b.1 > p.1) {
            // x coordinate of the edge at height p.1, compared without division
            let lhs = (p.0 - a.0) as i128 * (b.1 - a.1) as i128;
            let rhs = (b.0 - a.0) as i128 * (p.1 - a.1) as i128;
            let crosses = match b.1 > a.1 {
                true => lhs < rhs,
                false => lhs > rhs,
            };
            if crosses {
                inside = !inside;
            }
        }
    }
    match inside {
        true => RingPosition::Inside,
        false => RingPosition::Outside,
    }
}

/// Whether `p` lies in the closed region (boundaries count as inside)
pub fn region_contains(region: &IntRegion, p: IntPoint) -> bool {
    region.0.iter().any(|poly| {
        point_in_ring(p, &open_ring(poly.exterior())) != RingPosition::Outside
            && poly
                .interiors()
                .iter()
                .all(|h| point_in_ring(p, &open_ring(h)) != RingPosition::Inside)
    })
}

/// Closest point on segment `a`-`b` to `p`, as (parameter along the segment, squared distance)
pub fn closest_on_segment(p: IntPoint, a: IntPoint, b: IntPoint) -> (f64, f64) {
    let (dx, dy) = ((b.0 - a.0) as f64, (b.1 - a.1) as f64);
    let len_sq = dx * dx + dy * dy;
    let t = match len_sq > 0.0 {
        true => (((p.0 - a.0) as f64 * dx + (p.1 - a.1) as f64 * dy) / len_sq).clamp(0.0, 1.0),
        false => 0.0,
    };
    let (cx, cy) = (a.0 as f64 + t * dx, a.1 as f64 + t * dy);
    let sq_dist = (p.0 as f64 - cx).powi(2) + (p.1 as f64 - cy).powi(2);
    (t, sq_dist)
}

/// Location on a set of rings: ring index, segment index and parameter along that segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingLocation {
    pub ring: usize,
    pub segment: usize,
    pub t: f64,
    pub distance: f64,
}

/// Finds the point on any of the (closed) `rings` closest to `p`
pub fn closest_on_rings(rings: &[IntPath], p: IntPoint) -> Option<RingLocation> {
    rings
        .iter()
        .enumerate()
        .flat_map(|(ri, ring)| {
            (0..ring.len()).map(move |si| {
                let (a, b) = (ring[si], ring[(si + 1) % ring.len()]);
                let (t, sq_dist) = closest_on_segment(p, a, b);
                (ri, si, t, sq_dist)
            })
        })
        .min_by_key(|(_, _, _, sq_dist)| OrderedFloat(*sq_dist))
        .map(|(ring, segment, t, sq_dist)| RingLocation {
            ring,
            segment,
            t,
            distance: sq_dist.sqrt(),
        })
}

/// Distance from `p` to the nearest ring edge, infinite without rings
pub fn distance_to_rings(rings: &[IntPath], p: IntPoint) -> f64 {
    closest_on_rings(rings, p).map_or(f64::INFINITY, |l| l.distance)
}

/// Intersection parameter `t` along `p1`-`p2` where it crosses `p3`-`p4`
fn segment_intersection(p1: IntPoint, p2: IntPoint, p3: IntPoint, p4: IntPoint) -> Option<f64> {
    let (d1x, d1y) = ((p2.0 - p1.0) as f64, (p2.1 - p1.1) as f64);
    let (d2x, d2y) = ((p4.0 - p3.0) as f64, (p4.1 - p3.1) as f64);
    let denom = d1x * d2y - d1y * d2x;
    if denom == 0.0 {
        return None;
    }
    let (ox, oy) = ((p3.0 - p1.0) as f64, (p3.1 - p1.1) as f64);
    let t = (ox * d2y - oy * d2x) / denom;
    let u = (ox * d1y - oy * d1x) / denom;
    match (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        true => Some(t),
        false => None,
    }
}

/// First point where the segment `from`-`to` crosses any of the rings
pub fn first_intersection(rings: &[IntPath], from: IntPoint, to: IntPoint) -> Option<IntPoint> {
    rings
        .iter()
        .flat_map(|ring| ring.iter().circular_tuple_windows())
        .filter_map(|(a, b)| segment_intersection(from, to, *a, *b))
        .min_by_key(|t| OrderedFloat(*t))
        .map(|t| {
            IntPoint(
                (from.0 as f64 + t * (to.0 - from.0) as f64).round() as i64,
                (from.1 as f64 + t * (to.1 - from.1) as f64).round() as i64,
            )
        })
}

/// Removes points closer than `tolerance` to the chord between their kept neighbours.
/// The first and last point are always kept.
pub fn clean_path(path: &[IntPoint], tolerance: f64) -> IntPath {
    let mut deduped = path.to_vec();
    deduped.dedup();
    if deduped.len() < 3 {
        return deduped;
    }
    let tol_sq = tolerance * tolerance;
    let mut cleaned = vec![deduped[0]];
    for i in 1..deduped.len() - 1 {
        let prev = cleaned[cleaned.len() - 1];
        let (_, sq_dist) = closest_on_segment(deduped[i], prev, deduped[i + 1]);
        if sq_dist >= tol_sq {
            cleaned.push(deduped[i]);
        }
    }
    cleaned.push(deduped[deduped.len() - 1]);
    cleaned
}

/// Mean of the buffered directions, renormalized
pub fn average_direction(buffer: &VecDeque<DirVec>) -> DirVec {
    let (sx, sy) = buffer
        .iter()
        .fold((0.0, 0.0), |(sx, sy), d| (sx + d.0, sy + d.1));
    DirVec(sx, sy).normalized()
}

/// Removes the path which has a vertex closest to `p` and returns it rotated to start at that vertex
pub fn pop_path_closest_to(paths: &mut Vec<IntPath>, p: IntPoint) -> Option<IntPath> {
    let (path_idx, vertex_idx, _) = paths
        .iter()
        .enumerate()
        .flat_map(|(pi, path)| {
            path.iter()
                .enumerate()
                .map(move |(vi, v)| (pi, vi, v.sq_distance(&p)))
        })
        .min_by_key(|(_, _, d)| OrderedFloat(*d))?;
    let mut path = paths.remove(path_idx);
    path.rotate_left(vertex_idx);
    Some(path)
}
