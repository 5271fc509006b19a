mod point;
mod rect;

#[doc(inline)]
pub use point::DirVec;
#[doc(inline)]
pub use point::IntPoint;
#[doc(inline)]
pub use point::Point;
#[doc(inline)]
pub use rect::IntRect;
#[doc(inline)]
pub use rect::Rect;

/// Ordered sequence of points in user units
pub type Path = Vec<Point>;

/// Collection of paths describing one or more boundaries (even-odd fill)
pub type PathSet = Vec<Path>;

/// Ordered sequence of points on the scaled grid.
/// Rings are stored open: the closing edge back to the first point is implicit.
pub type IntPath = Vec<IntPoint>;

/// Closed area on the scaled grid: polygons with counter-clockwise outer rings and clockwise holes
pub type IntRegion = geo_types::MultiPolygon<i64>;
