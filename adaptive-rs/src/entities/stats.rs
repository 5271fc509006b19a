use serde::{Deserialize, Serialize};

/// Counters collected during a run.
/// Quality signals for the caller, none of them indicates a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub n_regions: usize,
    /// Regions for which no tool position or entry point exists
    pub n_unreachable_regions: usize,
    pub n_passes: usize,
    /// Accepted engagement matched steps
    pub n_steps: usize,
    pub n_iterations: usize,
    /// Steps accepted as best effort after the iteration cap
    pub n_unconverged: usize,
    /// Passes ended because even the best candidate overloaded the tool
    pub n_overload_stops: usize,
    /// Passes ended because not even the sharpest turn into the material reached the optimal cut area
    pub n_underload_stops: usize,
    /// Passes discarded for removing too little material
    pub n_dropped_passes: usize,
    pub n_unclear_links: usize,
    /// Finishing steps engaging more than the optimal cut area
    pub n_finishing_overcuts: usize,
    /// Cleared material in user units²
    pub cleared_area: f64,
    /// Largest ratio of cut area per distance over its optimum among accepted steps
    pub max_engagement_ratio: f64,
    /// Smallest such ratio, `None` before the first accepted step
    pub min_engagement_ratio: Option<f64>,
    pub cancelled: bool,
}

impl RunStats {
    /// Accounts an accepted step cutting `ratio` times its optimal area
    pub fn record_engagement(&mut self, ratio: f64) {
        self.max_engagement_ratio = self.max_engagement_ratio.max(ratio);
        self.min_engagement_ratio = Some(self.min_engagement_ratio.map_or(ratio, |r| r.min(ratio)));
    }

    pub fn merge(&mut self, other: &RunStats) {
        self.n_regions += other.n_regions;
        self.n_unreachable_regions += other.n_unreachable_regions;
        self.n_passes += other.n_passes;
        self.n_steps += other.n_steps;
        self.n_iterations += other.n_iterations;
        self.n_unconverged += other.n_unconverged;
        self.n_overload_stops += other.n_overload_stops;
        self.n_underload_stops += other.n_underload_stops;
        self.n_dropped_passes += other.n_dropped_passes;
        self.n_unclear_links += other.n_unclear_links;
        self.n_finishing_overcuts += other.n_finishing_overcuts;
        self.cleared_area += other.cleared_area;
        self.max_engagement_ratio = self.max_engagement_ratio.max(other.max_engagement_ratio);
        if let Some(ratio) = other.min_engagement_ratio {
            self.record_engagement(ratio);
        }
        self.cancelled |= other.cancelled;
    }
}
