use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::info;

use crate::engine::consts::PROGRESS_TICKS;
use crate::entities::{MotionType, Segment};
use crate::geometry::primitives::Point;

/// Callback receiving the toolpath produced since the previous report.
/// Returning `false` requests the run to stop.
pub type ProgressFn<'a> = dyn FnMut(&[Segment]) -> bool + 'a;

/// Throttles progress reports and tracks cancellation
pub struct ProgressReporter<'a> {
    callback: &'a mut ProgressFn<'a>,
    /// Stop flag shared with other region workers, if any
    shared_stop: Option<&'a AtomicBool>,
    pending: Vec<Segment>,
    last_report: Option<Instant>,
    stopped: bool,
    n_reports: usize,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: &'a mut ProgressFn<'a>, shared_stop: Option<&'a AtomicBool>) -> Self {
        Self {
            callback,
            shared_stop,
            pending: vec![],
            last_report: None,
            stopped: false,
            n_reports: 0,
        }
    }

    /// Starts a new segment in the pending progress paths
    pub fn begin_segment(&mut self, motion: MotionType, start: Point) {
        self.pending.push(Segment::new(motion, vec![start]));
    }

    /// Extends the last pending segment
    pub fn push_point(&mut self, p: Point) {
        match self.pending.last_mut() {
            Some(segment) => segment.path.push(p),
            None => self.begin_segment(MotionType::Cutting, p),
        }
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.pending.push(segment);
    }

    /// Reports the pending paths if forced or if the last report is older than [`PROGRESS_TICKS`].
    /// Returns whether the run should continue.
    pub fn checkpoint(&mut self, force: bool) -> bool {
        if self.is_stopped() {
            return false;
        }
        let due = self
            .last_report
            .is_none_or(|t| t.elapsed() >= PROGRESS_TICKS);
        if !(force || due) {
            return true;
        }
        self.last_report = Some(Instant::now());
        if self.pending.is_empty() {
            return true;
        }
        self.n_reports += 1;
        if !(self.callback)(&self.pending) {
            info!("[PROGRESS] stop requested after {} reports", self.n_reports);
            self.stop();
        }
        // keep the last point so the next report continues the same motion where this one ended
        let carried = self
            .pending
            .last()
            .and_then(|s| Some((s.motion, *s.path.last()?)));
        self.pending.clear();
        if let Some((motion, last)) = carried {
            self.begin_segment(motion, last);
        }
        !self.stopped
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        if let Some(flag) = self.shared_stop {
            flag.store(true, Ordering::Relaxed);
        }
    }

    pub fn is_stopped(&mut self) -> bool {
        if !self.stopped && self.shared_stop.is_some_and(|f| f.load(Ordering::Relaxed)) {
            self.stopped = true;
        }
        self.stopped
    }

    pub fn n_reports(&self) -> usize {
        self.n_reports
    }
}
