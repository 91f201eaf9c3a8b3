/// Live leaf set with prefix-summed area weights
pub mod frontier;
/// Refinement engine: tick, reset and invariant checks
pub mod refinement;
/// Area-weighted random leaf selection
pub mod selection;
