use serde::{Deserialize, Serialize};

use crate::entities::RunStats;

/// A point as an `(x, y)` pair
pub type ExtPoint = (f64, f64);

/// External representation of a [`Segment`](crate::entities::Segment).
/// The motion type is an integer code, see [`export::motion_type_code`](crate::io::export::motion_type_code).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtSegment {
    pub motion_type: u8,
    pub path: Vec<ExtPoint>,
}

/// External representation of an [`AdaptiveOutput`](crate::entities::AdaptiveOutput)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtAdaptiveOutput {
    pub helix_center_point: ExtPoint,
    pub start_point: ExtPoint,
    pub adaptive_paths: Vec<ExtSegment>,
    pub return_motion_type: u8,
}

/// External representation of an [`AdaptiveConfig`](crate::config::AdaptiveConfig).
/// Missing fields take their default values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ExtConfig {
    pub tool_diameter: f64,
    pub helix_ramp_diameter: f64,
    pub step_over_factor: f64,
    pub tolerance: f64,
    pub stock_to_leave: f64,
    pub force_inside_out: bool,
    pub keep_tool_down: bool,
    /// ClearingInside 0, ClearingOutside 1, ProfilingInside 2, ProfilingOutside 3
    pub op_type: u8,
    pub poly_tree_nesting_limit: usize,
    pub prevent_conventional_mode: bool,
}

impl Default for ExtConfig {
    fn default() -> Self {
        crate::io::export::export_config(&crate::config::AdaptiveConfig::default())
    }
}

/// A complete clearing job: configuration plus stock and target boundaries
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtJob {
    #[serde(default)]
    pub config: ExtConfig,
    pub stock: Vec<Vec<ExtPoint>>,
    pub target: Vec<Vec<ExtPoint>>,
}

/// Toolpaths of a run together with its statistics
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtResult {
    pub outputs: Vec<ExtAdaptiveOutput>,
    pub statistics: RunStats,
}
