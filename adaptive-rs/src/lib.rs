//! Adaptive clearing toolpath generation for 2.5D subtractive machining.
//!
//! Given a stock boundary and a target boundary, [`Adaptive2d`] generates tool center paths
//! which remove the material in between while keeping the engagement of the tool close to
//! an optimum chosen through the step-over factor.

/// Configuration of a clearing run
pub mod config;

/// The adaptive clearing engine
pub mod engine;

/// Results of a run: classified motions, per-region outputs and statistics
pub mod entities;

/// Geometric primitives and the integer geometry the engine works on
pub mod geometry;

/// Importing jobs into and exporting toolpaths out of this library
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;

#[doc(inline)]
pub use config::{AdaptiveConfig, OperationType};
#[doc(inline)]
pub use engine::Adaptive2d;
