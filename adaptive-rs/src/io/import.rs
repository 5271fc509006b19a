use std::path::Path;

use anyhow::{Result, bail, ensure};
use log::warn;

use crate::config::{AdaptiveConfig, OperationType};
use crate::entities::{AdaptiveOutput, MotionType, Segment};
use crate::geometry::primitives::{PathSet, Point};
use crate::io::ext_repr::{ExtAdaptiveOutput, ExtConfig, ExtJob, ExtPoint, ExtSegment};
use crate::io::read_json;

/// A validated clearing job
#[derive(Debug, Clone)]
pub struct Job {
    pub config: AdaptiveConfig,
    pub stock: PathSet,
    pub target: PathSet,
}

pub fn motion_type_from_code(code: u8) -> Result<MotionType> {
    Ok(match code {
        0 => MotionType::Cutting,
        1 => MotionType::LinkClear,
        2 => MotionType::LinkNotClear,
        3 => MotionType::LinkClearAtPrevPass,
        _ => bail!("unknown motion type code: {code}"),
    })
}

pub fn operation_type_from_code(code: u8) -> Result<OperationType> {
    Ok(match code {
        0 => OperationType::ClearingInside,
        1 => OperationType::ClearingOutside,
        2 => OperationType::ProfilingInside,
        3 => OperationType::ProfilingOutside,
        _ => bail!("unknown operation type code: {code}"),
    })
}

pub fn import_config(ext: &ExtConfig) -> Result<AdaptiveConfig> {
    ensure!(
        ext.tool_diameter.is_finite() && ext.tool_diameter > 0.0,
        "tool diameter must be positive, got {}",
        ext.tool_diameter
    );
    ensure!(
        ext.step_over_factor > 0.0 && ext.step_over_factor <= 1.0,
        "step over factor must be in (0, 1], got {}",
        ext.step_over_factor
    );
    ensure!(
        ext.tolerance.is_finite() && ext.tolerance > 0.0,
        "tolerance must be positive, got {}",
        ext.tolerance
    );
    ensure!(
        ext.helix_ramp_diameter.is_finite() && ext.stock_to_leave.is_finite(),
        "helix ramp diameter and stock to leave must be finite"
    );
    Ok(AdaptiveConfig {
        tool_diameter: ext.tool_diameter,
        helix_ramp_diameter: ext.helix_ramp_diameter,
        step_over_factor: ext.step_over_factor,
        tolerance: ext.tolerance,
        stock_to_leave: ext.stock_to_leave,
        force_inside_out: ext.force_inside_out,
        keep_tool_down: ext.keep_tool_down,
        op_type: operation_type_from_code(ext.op_type)?,
        poly_tree_nesting_limit: ext.poly_tree_nesting_limit,
        prevent_conventional_mode: ext.prevent_conventional_mode,
    })
}

pub fn import_point((x, y): ExtPoint) -> Result<Point> {
    ensure!(x.is_finite() && y.is_finite(), "non-finite coordinate ({x}, {y})");
    Ok(Point(x, y))
}

/// Imports a set of boundary rings, each needs at least three points
pub fn import_rings(rings: &[Vec<ExtPoint>]) -> Result<PathSet> {
    rings
        .iter()
        .enumerate()
        .map(|(i, ring)| -> Result<Vec<Point>> {
            ensure!(ring.len() >= 3, "ring {i} has only {} points", ring.len());
            ring.iter().map(|p| import_point(*p)).collect()
        })
        .collect()
}

pub fn import_job(ext: &ExtJob) -> Result<Job> {
    let job = Job {
        config: import_config(&ext.config)?,
        stock: import_rings(&ext.stock)?,
        target: import_rings(&ext.target)?,
    };
    if job.stock.is_empty() || job.target.is_empty() {
        warn!("job without stock or target boundary, nothing will be cleared");
    }
    Ok(job)
}

/// Reads and validates a job from a json file
pub fn read_job(path: &Path) -> Result<Job> {
    let ext: ExtJob = read_json(path)?;
    import_job(&ext)
}

pub fn import_segment(ext: &ExtSegment) -> Result<Segment> {
    let path = ext
        .path
        .iter()
        .map(|p| import_point(*p))
        .collect::<Result<_>>()?;
    Ok(Segment::new(motion_type_from_code(ext.motion_type)?, path))
}

pub fn import_output(ext: &ExtAdaptiveOutput) -> Result<AdaptiveOutput> {
    Ok(AdaptiveOutput {
        helix_center: import_point(ext.helix_center_point)?,
        start_point: import_point(ext.start_point)?,
        segments: ext
            .adaptive_paths
            .iter()
            .map(import_segment)
            .collect::<Result<_>>()?,
        return_motion: motion_type_from_code(ext.return_motion_type)?,
    })
}
