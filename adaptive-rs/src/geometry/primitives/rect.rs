use anyhow::Result;
use anyhow::ensure;

use crate::geometry::primitives::{IntPoint, Point};

/// Axis-aligned rectangle in floating point coordinates
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self> {
        ensure!(
            x_min < x_max && y_min < y_max,
            "invalid rectangle, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Smallest rectangle containing all `points`, `None` if it would be degenerate
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let (mut x_min, mut y_min) = (f64::MAX, f64::MAX);
        let (mut x_max, mut y_max) = (f64::MIN, f64::MIN);
        for Point(x, y) in points {
            x_min = x_min.min(x);
            y_min = y_min.min(y);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
        Rect::try_new(x_min, y_min, x_max, y_max).ok()
    }

    /// Returns a new rectangle with the same centroid but inflated
    /// to be the minimum square that contains `self`.
    pub fn inflate_to_square(&self) -> Rect {
        let width = self.width();
        let height = self.height();
        let mut dx = 0.0;
        let mut dy = 0.0;
        if height < width {
            dy = (width - height) / 2.0;
        } else if width < height {
            dx = (height - width) / 2.0;
        }
        Rect {
            x_min: self.x_min - dx,
            y_min: self.y_min - dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }

    /// Returns the 4 quadrants of `self`, counter-clockwise starting from the top right one
    pub fn quadrants(&self) -> [Self; 4] {
        let Point(cx, cy) = self.centroid();
        [
            Rect { x_min: cx, y_min: cy, ..*self },
            Rect { x_max: cx, y_min: cy, ..*self },
            Rect { x_max: cx, y_max: cy, ..*self },
            Rect { x_min: cx, y_max: cy, ..*self },
        ]
    }

    pub fn centroid(&self) -> Point {
        Point((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn diameter(&self) -> f64 {
        (self.width().powi(2) + self.height().powi(2)).sqrt()
    }

    /// Largest absolute coordinate value within `self`
    pub fn max_abs_coord(&self) -> f64 {
        [self.x_min, self.y_min, self.x_max, self.y_max]
            .into_iter()
            .fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

/// Axis-aligned rectangle on the scaled integer grid
#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub struct IntRect {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl IntRect {
    /// Square of half-width `reach` around `center`
    pub fn around(center: IntPoint, reach: i64) -> Self {
        IntRect {
            x_min: center.0 - reach,
            y_min: center.1 - reach,
            x_max: center.0 + reach,
            y_max: center.1 + reach,
        }
    }

    pub fn bounding<'a>(points: impl IntoIterator<Item = &'a IntPoint>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => IntRect {
                    x_min: p.0,
                    y_min: p.1,
                    x_max: p.0,
                    y_max: p.1,
                },
                Some(r) => IntRect {
                    x_min: r.x_min.min(p.0),
                    y_min: r.y_min.min(p.1),
                    x_max: r.x_max.max(p.0),
                    y_max: r.y_max.max(p.1),
                },
            })
        })
    }

    pub fn inflate(&self, d: i64) -> Self {
        IntRect {
            x_min: self.x_min - d,
            y_min: self.y_min - d,
            x_max: self.x_max + d,
            y_max: self.y_max + d,
        }
    }

    pub fn contains(&self, other: &IntRect) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }

    /// Corners in counter-clockwise order
    pub fn corners(&self) -> [IntPoint; 4] {
        [
            IntPoint(self.x_min, self.y_min),
            IntPoint(self.x_max, self.y_min),
            IntPoint(self.x_max, self.y_max),
            IntPoint(self.x_min, self.y_max),
        ]
    }

    pub fn as_rect(&self) -> Option<Rect> {
        Rect::try_new(
            self.x_min as f64,
            self.y_min as f64,
            self.x_max as f64,
            self.y_max as f64,
        )
        .ok()
    }
}
