use std::ops::{Add, Sub};

use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Point in user units
#[derive(Debug, Clone, PartialEq, Copy, Default, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.0 - other.0).powi(2) + (self.1 - other.1).powi(2)).sqrt()
    }

    pub fn sq_distance(&self, other: &Point) -> f64 {
        (self.0 - other.0).powi(2) + (self.1 - other.1).powi(2)
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.0, p.1)
    }
}

impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Point(p.0, p.1)
    }
}

/// Point on the scaled integer grid.
/// All boolean and offset geometry of a run happens in this space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct IntPoint(pub i64, pub i64);

impl IntPoint {
    pub fn distance(&self, other: &IntPoint) -> f64 {
        self.sq_distance(other).sqrt()
    }

    pub fn sq_distance(&self, other: &IntPoint) -> f64 {
        let dx = (self.0 - other.0) as f64;
        let dy = (self.1 - other.1) as f64;
        dx * dx + dy * dy
    }

    /// Moves the point `dist` units along `dir` and snaps it back onto the grid
    pub fn translate(&self, dir: DirVec, dist: f64) -> IntPoint {
        IntPoint(
            (self.0 as f64 + dir.0 * dist).round() as i64,
            (self.1 as f64 + dir.1 * dist).round() as i64,
        )
    }
}

impl Add for IntPoint {
    type Output = IntPoint;

    fn add(self, rhs: IntPoint) -> IntPoint {
        IntPoint(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for IntPoint {
    type Output = IntPoint;

    fn sub(self, rhs: IntPoint) -> IntPoint {
        IntPoint(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl From<IntPoint> for Coord<i64> {
    fn from(p: IntPoint) -> Self {
        Coord { x: p.0, y: p.1 }
    }
}

impl From<Coord<i64>> for IntPoint {
    fn from(c: Coord<i64>) -> Self {
        IntPoint(c.x, c.y)
    }
}

/// Direction (or displacement) in the scaled space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirVec(pub f64, pub f64);

impl DirVec {
    /// Unit vector pointing from `from` to `to`, zero if both coincide
    pub fn between(from: IntPoint, to: IntPoint) -> DirVec {
        DirVec((to.0 - from.0) as f64, (to.1 - from.1) as f64).normalized()
    }

    pub fn norm(&self) -> f64 {
        (self.0 * self.0 + self.1 * self.1).sqrt()
    }

    pub fn normalized(&self) -> DirVec {
        let n = self.norm();
        match n > 0.0 {
            true => DirVec(self.0 / n, self.1 / n),
            false => DirVec(0.0, 0.0),
        }
    }

    /// Counter-clockwise rotation by `angle` radians
    pub fn rotate(&self, angle: f64) -> DirVec {
        let (s, c) = angle.sin_cos();
        DirVec(self.0 * c - self.1 * s, self.0 * s + self.1 * c)
    }

    /// z-component of the cross product, positive when `other` lies to the left
    pub fn cross(&self, other: &DirVec) -> f64 {
        self.0 * other.1 - self.1 * other.0
    }
}
