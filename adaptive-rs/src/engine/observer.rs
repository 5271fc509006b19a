use crate::geometry::primitives::Point;

/// Layer a debug drawing belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugLayer {
    ToolBound,
    Cleared,
    Entry,
    EngagePoint,
    Pass,
    Link,
    Finishing,
}

/// Inspection hooks called while a region is processed.
/// Never influences the produced toolpaths; every hook defaults to a no-op.
pub trait DebugObserver {
    /// Whether the observer wants drawings at all, checked before converting geometry
    fn enabled(&self) -> bool {
        false
    }

    fn draw_circle(&mut self, _center: Point, _radius: f64, _layer: DebugLayer) {}

    fn draw_path(&mut self, _path: &[Point], _layer: DebugLayer) {}

    fn clear_screen(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DebugObserver for NoopObserver {}
