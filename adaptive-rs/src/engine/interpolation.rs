use crate::engine::consts::{MAX_ANGLE, MIN_ANGLE, NTOL};

/// Samples of (cut area, steering angle) from one step's search, kept sorted by area.
/// Used to predict the angle producing a target area, assuming the area decreases as the angle grows.
#[derive(Debug, Clone, Default)]
pub struct AngleInterpolator {
    areas: Vec<f64>,
    angles: Vec<f64>,
}

impl AngleInterpolator {
    pub fn clear(&mut self) {
        self.areas.clear();
        self.angles.clear();
    }

    /// Adds a sample, ignoring it if its area is within [`NTOL`] of an existing one
    pub fn add_point(&mut self, area: f64, angle: f64) {
        let idx = self.areas.partition_point(|a| *a < area);
        let duplicate = [idx.checked_sub(1), Some(idx)]
            .into_iter()
            .flatten()
            .filter_map(|i| self.areas.get(i))
            .any(|a| (a - area).abs() <= NTOL);
        if !duplicate {
            self.areas.insert(idx, area);
            self.angles.insert(idx, angle);
        }
    }

    pub fn n_points(&self) -> usize {
        self.areas.len()
    }

    /// Linear interpolation of the angle at `target_area`.
    /// Outside the sampled range it returns the extreme angle pushing towards the target.
    pub fn interpolate_angle(&self, target_area: f64) -> f64 {
        let n = self.areas.len();
        if n < 2 || target_area > self.areas[n - 1] {
            // more engagement needed than ever seen, turn into the material
            return MIN_ANGLE;
        }
        if target_area < self.areas[0] {
            return MAX_ANGLE;
        }
        (1..n)
            .find(|&i| self.areas[i - 1] <= target_area && self.areas[i] > target_area)
            .map(|i| {
                let f = (target_area - self.areas[i - 1]) / (self.areas[i] - self.areas[i - 1]);
                self.angles[i - 1] + f * (self.angles[i] - self.angles[i - 1])
            })
            .unwrap_or(MIN_ANGLE)
    }

    /// Deterministic seed angle used while fewer than two samples exist.
    /// Visits the range in van der Corput order: middle, quarters, eighths...
    pub fn seed_angle(&self, iteration: usize) -> f64 {
        let mut n = iteration + 1;
        let (mut fraction, mut base) = (0.0, 0.5);
        while n > 0 {
            if n & 1 == 1 {
                fraction += base;
            }
            base /= 2.0;
            n >>= 1;
        }
        MIN_ANGLE + (MAX_ANGLE - MIN_ANGLE) * fraction
    }
}

pub fn clamp_angle(angle: f64) -> f64 {
    angle.clamp(MIN_ANGLE, MAX_ANGLE)
}
