use crate::config::AdaptiveConfig;
use crate::engine::consts::{
    ENGAGE_AREA_THR_FACTOR, ENGAGE_SCAN_DISTANCE_FACTOR, MIN_CUT_AREA_FACTOR, RESOLUTION_FACTOR,
};
use crate::geometry::clip;
use crate::geometry::footprint::Footprint;
use crate::geometry::primitives::{IntPoint, Rect};
use crate::geometry::scaling::Scaler;

/// Read-only state of one run: the sanitized configuration and every quantity derived from it.
/// Created at the start of an execution and shared by all regions.
/// The live counters of a run are kept in [`RunStats`](crate::entities::RunStats) and the
/// [`ProgressReporter`](crate::engine::progress::ProgressReporter) so this stays shareable between region workers.
#[derive(Debug, Clone)]
pub struct RunState {
    pub config: AdaptiveConfig,
    pub scaler: Scaler,
    /// Tool footprint centered at the origin
    pub tool: Footprint,
    pub tool_radius: f64,
    pub helix_radius: f64,
    /// Distance adaptive passes keep from the boundaries, removed by the finishing pass
    pub finish_pass_offset: f64,
    pub bbox_size: f64,
    /// Area removed by a straight move of half the tool radius into untouched material
    pub reference_cut_area: f64,
    /// Target cut area per unit of travelled distance
    pub optimal_cut_area_pd: f64,
}

impl RunState {
    pub fn new(config: &AdaptiveConfig, bbox: Option<Rect>) -> Self {
        let config = config.sanitized();
        // geometry may grow by the outside overshoot, the profiling band and the stock to leave
        let margin = 6.0 * config.tool_diameter + 2.0 * config.helix_ramp_diameter + config.stock_to_leave;
        let scaler = Scaler::new(
            bbox,
            margin,
            config.tolerance,
            config.tool_diameter,
            config.step_over_factor,
        );
        let tool_radius = scaler.scale(config.tool_diameter / 2.0);
        let tool = Footprint::new(tool_radius);
        let reference_cut_area = clip::measure_difference(
            &tool.disc(IntPoint(0, 0)),
            &tool.disc(IntPoint((tool_radius / 2.0).round() as i64, 0)),
        )
        .area;
        let optimal_cut_area_pd = 2.0 * config.step_over_factor * reference_cut_area / tool_radius;

        Self {
            scaler,
            tool,
            tool_radius,
            helix_radius: scaler.scale(config.helix_ramp_diameter / 2.0),
            finish_pass_offset: scaler.scale(config.tolerance) / 2.0,
            bbox_size: bbox.map_or(0.0, |b| scaler.scale(b.width().max(b.height()))),
            reference_cut_area,
            optimal_cut_area_pd,
            config,
        }
    }

    /// Area removed by moving one tool radius at optimal engagement
    pub fn optimal_cut_area(&self) -> f64 {
        self.optimal_cut_area_pd * self.tool_radius
    }

    pub fn step_over(&self) -> f64 {
        self.config.step_over_factor * 2.0 * self.tool_radius
    }

    pub fn max_step(&self) -> f64 {
        (self.tool_radius / 4.0)
            .min(8.0 * RESOLUTION_FACTOR)
            .max(RESOLUTION_FACTOR)
    }

    /// Distance within which the stepper slows down to its minimal step
    pub fn slow_down_distance(&self) -> f64 {
        (self.tool_radius / 4.0).max(8.0 * RESOLUTION_FACTOR)
    }

    pub fn engage_scan_step(&self) -> f64 {
        (ENGAGE_SCAN_DISTANCE_FACTOR * 2.0 * self.tool_radius).max(1.0)
    }

    /// Lateral distance between the cleared boundary and an engage point,
    /// leaving the tool one step-over into the material
    pub fn engage_inset(&self) -> f64 {
        (self.tool_radius - self.step_over()).max(0.0)
    }

    /// Range of material area under the footprint accepted at an engage point
    pub fn engage_area_range(&self) -> (f64, f64) {
        (
            ENGAGE_AREA_THR_FACTOR * self.optimal_cut_area(),
            4.0 * self.reference_cut_area * self.config.step_over_factor,
        )
    }

    /// Below this cut area a single step is considered to hit no material
    pub fn min_step_cut_area(&self) -> f64 {
        0.5 * MIN_CUT_AREA_FACTOR * self.optimal_cut_area_pd * RESOLUTION_FACTOR
    }

    /// Passes removing less than this area are dropped
    pub fn min_pass_cut_area(&self) -> f64 {
        MIN_CUT_AREA_FACTOR * self.optimal_cut_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimal_area_matches_step_over_width() {
        let bbox = Rect::try_new(0.0, 0.0, 100.0, 100.0).ok();
        let run = RunState::new(&AdaptiveConfig::default(), bbox);
        assert_eq!(run.scaler.scale_factor, 80.0);
        assert_eq!(run.tool_radius, 200.0);
        // deep in the material the cut width equals the step over
        let width = run.step_over();
        assert!((run.optimal_cut_area_pd - width).abs() < 0.05 * width);
        let (min, max) = run.engage_area_range();
        assert!(min < max);
        assert!(run.min_step_cut_area() < run.min_pass_cut_area());
        assert_eq!(run.engage_inset(), run.tool_radius - width);
    }
}
