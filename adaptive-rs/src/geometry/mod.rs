/// Boolean operations on scaled regions
pub mod clip;

pub mod convex_hull;

/// Discretized tool footprint: discs, stadiums and sweeps
pub mod footprint;

/// Rounded offsets of regions
pub mod offset;

/// Point, ring and path helpers on the scaled grid
pub mod path_utils;

/// Pole of inaccessibility of a region
pub mod poi;

/// Geometric primitives
pub mod primitives;

/// User units to scaled grid and back
pub mod scaling;
