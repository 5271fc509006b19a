use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Which side of the boundaries is machined and how the tool enters the material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Clear the stock inside its boundary, keeping the target
    #[default]
    ClearingInside,
    /// Clear around the target, allowing the tool to run beyond the stock
    ClearingOutside,
    /// Profile along the inside of the target boundary
    ProfilingInside,
    /// Profile along the outside of the target boundary
    ProfilingOutside,
}

/// Configuration of an adaptive clearing run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub tool_diameter: f64,
    /// Diameter of the helical ramp used to enter the material from inside.
    /// Clamped to [tool_diameter / 8, tool_diameter].
    pub helix_ramp_diameter: f64,
    /// Nominal lateral engagement as a fraction of the tool diameter
    pub step_over_factor: f64,
    /// Geometric and area matching precision, clamped to [0.01, 0.2]
    pub tolerance: f64,
    /// Finishing allowance kept along the target boundaries
    pub stock_to_leave: f64,
    /// Always enter from inside the material, even when an entry from outside the stock is possible
    pub force_inside_out: bool,
    /// Link consecutive passes without retracting where the link is clear
    pub keep_tool_down: bool,
    pub op_type: OperationType,
    /// Maximum nesting depth of material regions, 0 for unlimited
    pub poly_tree_nesting_limit: usize,
    /// End a pass rather than cut with the material on the left of the travel direction
    pub prevent_conventional_mode: bool,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            tool_diameter: 5.0,
            helix_ramp_diameter: 0.0,
            step_over_factor: 0.2,
            tolerance: 0.1,
            stock_to_leave: 0.0,
            force_inside_out: true,
            keep_tool_down: true,
            op_type: OperationType::ClearingInside,
            poly_tree_nesting_limit: 0,
            prevent_conventional_mode: true,
        }
    }
}

impl AdaptiveConfig {
    pub const MIN_TOLERANCE: f64 = 0.01;
    pub const MAX_TOLERANCE: f64 = 0.2;

    /// Returns a copy with every value clamped into its valid range
    pub fn sanitized(&self) -> Self {
        let mut c = *self;
        let default = AdaptiveConfig::default();
        if !(c.tool_diameter.is_finite() && c.tool_diameter > 0.0) {
            warn!(
                "[CONFIG] invalid tool diameter {}, using {}",
                c.tool_diameter, default.tool_diameter
            );
            c.tool_diameter = default.tool_diameter;
        }
        let tolerance = match c.tolerance.is_finite() {
            true => c.tolerance.clamp(Self::MIN_TOLERANCE, Self::MAX_TOLERANCE),
            false => default.tolerance,
        };
        if tolerance != c.tolerance {
            warn!("[CONFIG] tolerance {} clamped to {}", c.tolerance, tolerance);
            c.tolerance = tolerance;
        }
        if !(c.step_over_factor.is_finite() && c.step_over_factor > 0.0 && c.step_over_factor <= 1.0) {
            let clamped = match c.step_over_factor.is_finite() {
                true => c.step_over_factor.clamp(0.01, 1.0),
                false => default.step_over_factor,
            };
            warn!(
                "[CONFIG] step over factor {} clamped to {}",
                c.step_over_factor, clamped
            );
            c.step_over_factor = clamped;
        }
        let helix = match c.helix_ramp_diameter.is_finite() {
            true => c
                .helix_ramp_diameter
                .clamp(c.tool_diameter / 8.0, c.tool_diameter),
            false => c.tool_diameter / 8.0,
        };
        if helix != c.helix_ramp_diameter {
            // the default of 0 always ends up here
            debug!(
                "[CONFIG] helix ramp diameter {} clamped to {}",
                c.helix_ramp_diameter, helix
            );
            c.helix_ramp_diameter = helix;
        }
        if !(c.stock_to_leave.is_finite() && c.stock_to_leave >= 0.0) {
            warn!("[CONFIG] stock to leave {} reset to 0", c.stock_to_leave);
            c.stock_to_leave = 0.0;
        }
        c
    }
}
