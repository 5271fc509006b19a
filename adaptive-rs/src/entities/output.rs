use serde::{Deserialize, Serialize};

use crate::geometry::primitives::{Path, Point};

/// Kind of a contiguous tool motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionType {
    /// Tool removes material
    Cutting,
    /// Reposition over area cleared at the current depth, the tool can stay down
    LinkClear,
    /// Reposition that may cross uncleared material, requires a full retract
    LinkNotClear,
    /// Reposition within the area cleared by the previous depth pass
    LinkClearAtPrevPass,
}

impl MotionType {
    pub fn is_link(&self) -> bool {
        !matches!(self, MotionType::Cutting)
    }
}

/// One classified, contiguous motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub motion: MotionType,
    pub path: Path,
}

impl Segment {
    pub fn new(motion: MotionType, path: Path) -> Self {
        Self { motion, path }
    }
}

/// Toolpath produced for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveOutput {
    /// Center of the helical entry ramp (or the plunge point when entering from outside)
    pub helix_center: Point,
    /// Where the first cutting segment starts
    pub start_point: Point,
    /// Classified motions in execution order
    pub segments: Vec<Segment>,
    /// How the tool gets from the last point back to the start point
    pub return_motion: MotionType,
}

impl AdaptiveOutput {
    pub fn cutting_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(|s| s.motion == MotionType::Cutting)
    }

    pub fn n_points(&self) -> usize {
        self.segments.iter().map(|s| s.path.len()).sum()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.segments.iter().rev().find_map(|s| s.path.last().copied())
    }
}
