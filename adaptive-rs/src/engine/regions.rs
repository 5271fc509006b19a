use geo_types::{MultiPolygon, Polygon};
use log::{debug, info, warn};

use crate::config::OperationType;
use crate::engine::consts::RESOLUTION_FACTOR;
use crate::engine::run_state::RunState;
use crate::geometry::clip;
use crate::geometry::offset::offset_region;
use crate::geometry::path_utils::{RingPosition, open_ring, point_in_ring, region_area, rings};
use crate::geometry::primitives::{IntPath, IntRegion};

/// One connected area processed independently from all others
#[derive(Debug, Clone)]
pub struct Region {
    pub index: usize,
    /// Material polygon this region was derived from
    pub material: IntRegion,
    /// Admissible tool center positions during adaptive passes
    pub tool_bound: IntRegion,
    pub tool_bound_rings: Vec<IntPath>,
    /// Area the tool can reach from within the tool bound
    pub bound: IntRegion,
    /// Closed tool center paths of the finishing pass along the walls
    pub finishing_paths: Vec<IntPath>,
}

#[derive(Debug, Clone)]
pub struct Decomposition {
    pub regions: Vec<Region>,
    /// Material polygons too narrow for the tool
    pub n_unreachable: usize,
}

/// Splits the material to remove into independently processable regions
pub fn decompose(run: &RunState, stock: &IntRegion, target: &IntRegion) -> Decomposition {
    let material = material_to_remove(run, stock, target);
    let polygons = apply_nesting_limit(material, run.config.poly_tree_nesting_limit);
    let r = run.tool_radius;
    let inset = r + run.finish_pass_offset;

    let mut regions = vec![];
    let mut n_unreachable = 0;
    for (i, material) in polygons.into_iter().enumerate() {
        let tool_bound = offset_region(&material, -inset);
        if clip::is_empty(&tool_bound) {
            warn!(
                "[REGION] material polygon {i} ({:.3} units²) is too narrow for the tool, unreachable",
                run.scaler.unscale_area(region_area(&material))
            );
            n_unreachable += 1;
            continue;
        }
        for sub in tool_bound.0 {
            let tool_bound = MultiPolygon::new(vec![sub]);
            let bound = offset_region(&tool_bound, inset);
            let finishing_paths = rings(&offset_region(&bound, -r));
            regions.push(Region {
                index: regions.len(),
                material: material.clone(),
                tool_bound_rings: rings(&tool_bound),
                tool_bound,
                bound,
                finishing_paths,
            });
        }
    }
    info!(
        "[REGION] {} region(s) to clear, {} unreachable",
        regions.len(),
        n_unreachable
    );
    Decomposition {
        regions,
        n_unreachable,
    }
}

/// Material the operation removes, see [`OperationType`]
pub fn material_to_remove(run: &RunState, stock: &IntRegion, target: &IntRegion) -> IntRegion {
    let config = &run.config;
    let r = run.tool_radius;
    let stock_to_leave = run.scaler.scale(config.stock_to_leave);
    // width of the band machined by profiling operations
    let band = 2.0 * (run.helix_radius + r) + RESOLUTION_FACTOR;
    match config.op_type {
        OperationType::ClearingInside => clip::difference(stock, &offset_region(target, stock_to_leave)),
        OperationType::ClearingOutside => {
            let overshoot = match config.force_inside_out {
                true => 0.0,
                false => 4.0 * r + config.step_over_factor * r,
            };
            clip::difference(
                &offset_region(stock, overshoot),
                &offset_region(target, stock_to_leave),
            )
        }
        OperationType::ProfilingOutside => {
            let kept = offset_region(target, stock_to_leave);
            clip::difference(&offset_region(&kept, band), &kept)
        }
        OperationType::ProfilingInside => {
            let outline = offset_region(target, -stock_to_leave);
            clip::difference(&outline, &offset_region(&outline, -band))
        }
    }
}

/// Splits the material into single polygons and applies the nesting depth limit.
/// Outer polygons have depth 1, their holes 2, islands inside those holes 3 and so on.
/// Polygons deeper than `limit` are rejected, polygons at the limit lose their holes.
pub fn apply_nesting_limit(material: IntRegion, limit: usize) -> Vec<IntRegion> {
    let exteriors: Vec<IntPath> = material.0.iter().map(|p| open_ring(p.exterior())).collect();
    material
        .0
        .iter()
        .enumerate()
        .filter_map(|(i, poly)| {
            let sample = exteriors[i].first().copied()?;
            let n_enclosing = exteriors
                .iter()
                .enumerate()
                .filter(|(j, ext)| *j != i && point_in_ring(sample, ext) == RingPosition::Inside)
                .count();
            let depth = 1 + 2 * n_enclosing;
            match limit {
                0 => Some(poly.clone()),
                l if depth < l => Some(poly.clone()),
                l if depth == l => {
                    debug!("[REGION] polygon {i} at nesting limit {l}, holes merged");
                    Some(Polygon::new(poly.exterior().clone(), vec![]))
                }
                l => {
                    debug!("[REGION] polygon {i} at depth {depth} exceeds nesting limit {l}");
                    None
                }
            }
        })
        .map(|p| MultiPolygon::new(vec![p]))
        .collect()
}
