//! Progressive image reveal driven by an adaptive quadtree
//!
//! An image starts as a single blurred block and is sharpened one region at a
//! time. Each tick draws a live quadtree leaf with probability proportional to
//! its area, lowers the detail level of its pixels by one and splits it into
//! four quadrants. The per-pixel detail buffer is what a renderer samples.

#![deny(unsafe_code)]

/// Frontier, leaf selection and the refinement engine
pub mod algorithm;
/// Input/output operations, configuration and error handling
pub mod io;
/// Integer prefix sums backing weighted selection
pub mod math;
/// Quadtree arena and detail buffer
pub mod spatial;

pub use algorithm::refinement::{RefineInfo, RefineKind, RefineOutcome, RefinementEngine};
pub use io::error::{Result, RevealError};
