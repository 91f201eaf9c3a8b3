//! Per-pixel detail levels read by the renderer
//!
//! Level `v` at a pixel means "sample from a block of side `2^v`": 0 is fully
//! resolved and `max_level` is a single block covering the whole grid.

use ndarray::{Array2, s};

use crate::io::error::{Result, invalid_state};
use crate::spatial::quadtree::Region;

/// Row-major `side_length x side_length` grid of detail levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailBuffer {
    /// Indexed `[row, col]`, i.e. `[y, x]`
    levels: Array2<u8>,
    max_level: u8,
}

impl DetailBuffer {
    /// Create a buffer with every pixel at `max_level`
    pub fn new(side_length: u32, max_level: u8) -> Self {
        let side = side_length as usize;
        Self {
            levels: Array2::from_elem((side, side), max_level),
            max_level,
        }
    }

    /// Grid side length
    pub fn side_length(&self) -> u32 {
        self.levels.nrows() as u32
    }

    /// Coarsest level, held by every pixel after a reset
    pub const fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Flat row-major view, suitable for uploading as a single-channel texture
    pub fn as_slice(&self) -> &[u8] {
        // Built by `from_elem` and only mutated in place, so always contiguous
        self.levels.as_slice().unwrap_or(&[])
    }

    /// Two-dimensional view indexed `[y, x]`
    pub const fn levels(&self) -> &Array2<u8> {
        &self.levels
    }

    /// Level at pixel `(x, y)`
    pub fn level(&self, x: u32, y: u32) -> Option<u8> {
        self.levels.get([y as usize, x as usize]).copied()
    }

    /// Restore every pixel to `max_level`
    pub fn fill_max(&mut self) {
        self.levels.fill(self.max_level);
    }

    /// Shared level of a region, or `None` if it is mixed or out of bounds
    pub fn region_level(&self, region: Region) -> Option<u8> {
        if !self.in_bounds(region) {
            return None;
        }
        let view = self.levels.slice(s![region.rows(), region.cols()]);
        let first = view.iter().next().copied()?;
        view.iter().all(|&level| level == first).then_some(first)
    }

    /// Lower every pixel of `region` by one level
    ///
    /// Every pixel must currently hold `expected`; the region is left
    /// untouched when that does not hold.
    ///
    /// # Errors
    ///
    /// Returns an invalid state error if the region lies outside the grid,
    /// `expected` is already 0, or any pixel differs from `expected`
    pub fn sharpen(&mut self, region: Region, expected: u8) -> Result<()> {
        if !self.in_bounds(region) {
            return Err(invalid_state(&format!(
                "region {region:?} exceeds the {side}x{side} grid",
                side = self.side_length()
            )));
        }
        if expected == 0 {
            return Err(invalid_state(&format!(
                "region {region:?} is already fully resolved"
            )));
        }

        let mut view = self.levels.slice_mut(s![region.rows(), region.cols()]);
        if let Some(&found) = view.iter().find(|&&level| level != expected) {
            return Err(invalid_state(&format!(
                "region {region:?} holds level {found}, expected uniform level {expected}"
            )));
        }

        view.mapv_inplace(|level| level - 1);
        Ok(())
    }

    /// Sum of all detail levels; zero once the image is fully resolved
    pub fn blur_energy(&self) -> u64 {
        self.levels.iter().map(|&level| u64::from(level)).sum()
    }

    /// Test if every pixel is at level 0
    pub fn is_resolved(&self) -> bool {
        self.levels.iter().all(|&level| level == 0)
    }

    fn in_bounds(&self, region: Region) -> bool {
        let side = u64::from(self.side_length());
        region.extent > 0
            && u64::from(region.x) + u64::from(region.extent) <= side
            && u64::from(region.y) + u64::from(region.extent) <= side
    }
}
