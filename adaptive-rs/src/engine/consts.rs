use std::f64::consts::FRAC_PI_4;
use std::time::Duration;

/// Grid units per tolerance unit
pub const RESOLUTION_FACTOR: f64 = 8.0;
/// Maximum number of angle evaluations per step
pub const MAX_ITERATIONS: usize = 16;
/// Relative deviation from the optimal cut area at which a step is accepted
pub const AREA_ERROR_FACTOR: f64 = 0.05;
/// Relative overload allowed for steps accepted without convergence
pub const OVERLOAD_BOUND_FACTOR: f64 = 2.0 * AREA_ERROR_FACTOR;
pub const ANGLE_HISTORY_POINTS: usize = 3;
pub const DIRECTION_SMOOTHING_BUFLEN: usize = 3;
pub const ENGAGE_AREA_THR_FACTOR: f64 = 0.2;
pub const ENGAGE_SCAN_DISTANCE_FACTOR: f64 = 0.1;
/// Laps over all engage rings walked before the search for an engage point gives up
pub const ENGAGE_MAX_LAPS: usize = 2;
pub const CLEAN_PATH_TOLERANCE: f64 = 0.5;
pub const FINISHING_CLEAN_PATH_TOLERANCE: f64 = 0.1;
pub const MIN_CUT_AREA_FACTOR: f64 = 0.1;
/// Debug ceiling on passes per region
pub const PASSES_LIMIT: usize = usize::MAX;
/// Debug ceiling on points per pass
pub const POINTS_PER_PASS_LIMIT: usize = usize::MAX;
pub const PROGRESS_TICKS: Duration = Duration::from_millis(50);
pub const NTOL: f64 = 1.0e-7;

/// Steering range of the stepper, negative angles turn right (into the material)
pub const MIN_ANGLE: f64 = -FRAC_PI_4;
pub const MAX_ANGLE: f64 = FRAC_PI_4;
/// Times an overloaded minimal step may rotate its search range by [`MAX_ANGLE`] towards the cleared side
pub const MAX_ESCAPE_TURNS: usize = 2;

/// Largest absolute coordinate on the scaled grid
pub const MAX_SCALED_COORD: f64 = 1_073_741_824.0;
/// Pending moves kept out of the full cleared accumulator before merging them in
pub const CLEARED_FLUSH_POINTS: usize = 10;
/// Uncovered area (grid units²) below which a linking move counts as clear
pub const CLEAR_LINK_AREA: f64 = RESOLUTION_FACTOR;
/// Lateral offset (fraction of the tool radius) of new material left of the travel direction that marks conventional milling
pub const CONVENTIONAL_SIDE_FACTOR: f64 = 0.1;
