use crate::config::{AdaptiveConfig, OperationType};
use crate::entities::{AdaptiveOutput, MotionType, RunStats, Segment};
use crate::geometry::primitives::Point;
use crate::io::ext_repr::{ExtAdaptiveOutput, ExtConfig, ExtPoint, ExtResult, ExtSegment};

pub fn motion_type_code(motion: MotionType) -> u8 {
    match motion {
        MotionType::Cutting => 0,
        MotionType::LinkClear => 1,
        MotionType::LinkNotClear => 2,
        MotionType::LinkClearAtPrevPass => 3,
    }
}

pub fn operation_type_code(op_type: OperationType) -> u8 {
    match op_type {
        OperationType::ClearingInside => 0,
        OperationType::ClearingOutside => 1,
        OperationType::ProfilingInside => 2,
        OperationType::ProfilingOutside => 3,
    }
}

pub fn export_point(Point(x, y): Point) -> ExtPoint {
    (x, y)
}

pub fn export_segment(segment: &Segment) -> ExtSegment {
    ExtSegment {
        motion_type: motion_type_code(segment.motion),
        path: segment.path.iter().map(|p| export_point(*p)).collect(),
    }
}

pub fn export_output(output: &AdaptiveOutput) -> ExtAdaptiveOutput {
    ExtAdaptiveOutput {
        helix_center_point: export_point(output.helix_center),
        start_point: export_point(output.start_point),
        adaptive_paths: output.segments.iter().map(export_segment).collect(),
        return_motion_type: motion_type_code(output.return_motion),
    }
}

pub fn export_config(config: &AdaptiveConfig) -> ExtConfig {
    ExtConfig {
        tool_diameter: config.tool_diameter,
        helix_ramp_diameter: config.helix_ramp_diameter,
        step_over_factor: config.step_over_factor,
        tolerance: config.tolerance,
        stock_to_leave: config.stock_to_leave,
        force_inside_out: config.force_inside_out,
        keep_tool_down: config.keep_tool_down,
        op_type: operation_type_code(config.op_type),
        poly_tree_nesting_limit: config.poly_tree_nesting_limit,
        prevent_conventional_mode: config.prevent_conventional_mode,
    }
}

/// Exports the result of a run by composing an [`ExtResult`] from it
pub fn export_result(outputs: &[AdaptiveOutput], stats: &RunStats) -> ExtResult {
    ExtResult {
        outputs: outputs.iter().map(export_output).collect(),
        statistics: stats.clone(),
    }
}
