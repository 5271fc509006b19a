mod output;
mod stats;

#[doc(inline)]
pub use output::AdaptiveOutput;
#[doc(inline)]
pub use output::MotionType;
#[doc(inline)]
pub use output::Segment;
#[doc(inline)]
pub use stats::RunStats;
