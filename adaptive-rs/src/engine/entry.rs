use log::{debug, warn};

use crate::engine::cleared::ClearedArea;
use crate::engine::consts::RESOLUTION_FACTOR;
use crate::engine::engage::EngageWalker;
use crate::engine::regions::Region;
use crate::engine::run_state::RunState;
use crate::geometry::clip;
use crate::geometry::footprint::Footprint;
use crate::geometry::offset::offset_region;
use crate::geometry::path_utils::{region_contains, rings};
use crate::geometry::poi::pole_of_inaccessibility;
use crate::geometry::primitives::{DirVec, IntPoint, IntRect, IntRegion};

/// Where and how the tool starts cutting a region
#[derive(Debug, Clone)]
pub struct Entry {
    /// Center of the helical ramp, or the plunge point outside the stock
    pub helix_center: IntPoint,
    /// Tool position at the start of the first pass
    pub tool_pos: IntPoint,
    pub dir: DirVec,
    /// Area already free of material once the tool is in position
    pub cleared: IntRegion,
    pub helix_radius: f64,
    pub from_outside: bool,
}

/// Helical entry at the deepest point of the tool bound.
/// The helix shrinks when it does not fit, down to [`RESOLUTION_FACTOR`].
pub fn find_entry_inside(run: &RunState, region: &Region) -> Option<Entry> {
    let (center, clearance) = pole_of_inaccessibility(&region.tool_bound)?;
    let mut helix_radius = run.helix_radius;
    if clearance < helix_radius {
        if clearance < RESOLUTION_FACTOR {
            debug!(
                "[ENTRY] region {}: clearance {clearance:.1} too small for a helix",
                region.index
            );
            return None;
        }
        warn!(
            "[ENTRY] region {}: helix radius reduced from {:.3} to {:.3}",
            region.index,
            run.scaler.unscale(helix_radius),
            run.scaler.unscale(clearance)
        );
        helix_radius = clearance;
    }
    let helix = Footprint::new(helix_radius + run.tool_radius);
    Some(Entry {
        helix_center: center,
        tool_pos: IntPoint(center.0, center.1 - helix_radius.round() as i64),
        dir: DirVec(1.0, 0.0),
        cleared: helix.disc(center),
        helix_radius,
        from_outside: false,
    })
}

/// Air around the region: everything outside the stock within reach of the tool bound
pub fn outside_stock(run: &RunState, region: &Region, stock: &IntRegion) -> IntRegion {
    match IntRect::bounding(region.tool_bound_rings.iter().flatten()) {
        Some(bounds) => {
            let bounds = bounds.inflate((4.0 * run.tool_radius).ceil() as i64);
            clip::difference(&clip::rect_region(&bounds), stock)
        }
        None => clip::empty(),
    }
}

/// Entry from outside the stock: the tool comes down where there is no material and walks
/// in along the region boundary until it engages.
pub fn find_entry_outside(run: &RunState, region: &Region, stock: &IntRegion) -> Option<Entry> {
    let r = run.tool_radius;
    let outside = region
        .tool_bound_rings
        .iter()
        .flatten()
        .find(|p| !region_contains(stock, **p))
        .copied()?;

    let cleared = outside_stock(run, region, stock);

    // material on the right: tool bound rings reversed, stock rings reversed
    let stock_offset = offset_region(stock, r - run.config.step_over_factor * r);
    let engage_paths = region
        .tool_bound_rings
        .iter()
        .cloned()
        .chain(rings(&stock_offset))
        .map(|mut ring| {
            ring.reverse();
            ring
        })
        .collect();
    let mut walker = EngageWalker::new(engage_paths);
    walker.move_to_closest_point(outside);

    let mut area = ClearedArea::new(&run.tool, cleared.clone());
    let range = run.engage_area_range();
    if !walker.next_engage_point(&mut area, &run.tool, run.engage_scan_step(), range, None) {
        debug!("[ENTRY] region {}: no engage point from outside", region.index);
        return None;
    }
    let start = walker.current_point();
    Some(Entry {
        helix_center: start,
        tool_pos: start,
        dir: walker.current_dir(),
        cleared,
        helix_radius: 0.0,
        from_outside: true,
    })
}
