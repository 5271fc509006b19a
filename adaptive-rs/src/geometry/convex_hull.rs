use crate::geometry::primitives::IntPoint;

/// Filters a set of points to only include those that are part of the convex hull.
/// The hull is returned in counter-clockwise order.
pub fn convex_hull_from_points(mut points: Vec<IntPoint>) -> Vec<IntPoint> {
    //https://en.wikibooks.org/wiki/Algorithm_Implementation/Geometry/Convex_hull/Monotone_chain

    //sort the points lexicographically (x first, then y)
    points.sort_unstable();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut lower_hull = points
        .iter()
        .fold(vec![], |hull, p| grow_convex_hull(hull, *p));
    let mut upper_hull = points
        .iter()
        .rev()
        .fold(vec![], |hull, p| grow_convex_hull(hull, *p));

    //First and last element of both hull parts are the same point
    upper_hull.pop();
    lower_hull.pop();

    lower_hull.append(&mut upper_hull);
    lower_hull
}

fn grow_convex_hull(mut h: Vec<IntPoint>, next: IntPoint) -> Vec<IntPoint> {
    //pop all points from the hull which will be made irrelevant due to the new point
    while h.len() >= 2 && cross(h[h.len() - 2], h[h.len() - 1], next) <= 0 {
        h.pop();
    }
    h.push(next);
    h
}

fn cross(a: IntPoint, b: IntPoint, c: IntPoint) -> i128 {
    (b.0 - a.0) as i128 * (c.1 - a.1) as i128 - (b.1 - a.1) as i128 * (c.0 - a.0) as i128
}
