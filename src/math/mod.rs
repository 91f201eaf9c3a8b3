//! Mathematical utilities for the refinement engine

/// Integer prefix sums with logarithmic updates and weighted search
pub mod cumulative;
