mod adaptive;

/// Links between passes, finishing paths and the return motion of a region
pub mod assembler;

/// Accumulator of the area cleared within a region and cut area queries against it
pub mod cleared;

/// Processing of a single region from entry to return motion
pub mod clearing;

/// Tuning constants of the engine
pub mod consts;

/// Walker along the region boundaries searching for the next engage point
pub mod engage;

/// Entry point search, helical from inside or walking in from outside the stock
pub mod entry;

pub mod interpolation;

/// Hooks to observe intermediate geometry
pub mod observer;

/// Throttled progress reporting and cancellation
pub mod progress;

/// Decomposition of the material into independent regions
pub mod regions;

pub mod run_state;

/// Engagement matching stepper producing one adaptive pass
pub mod stepper;

#[doc(inline)]
pub use adaptive::Adaptive2d;
