//! Engine constants, runtime configuration defaults and validation

use crate::io::error::{Result, invalid_parameter};

/// Grid side length used when none is given
pub const DEFAULT_SIDE_LENGTH: u32 = 256;

// Level 12 still fits a `u8` detail buffer; larger grids only cost memory
/// Largest accepted grid side length
pub const MAX_SIDE_LENGTH: u32 = 4096;

/// Fixed seed for reproducible reveals
pub const DEFAULT_SEED: u64 = 42;

/// Sharpening ticks between captured animation frames
pub const DEFAULT_TICKS_PER_FRAME: usize = 64;

/// Longest edge of the rendered output in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_reveal";
/// Suffix added to detail map filenames
pub const DETAIL_MAP_SUFFIX: &str = "_detail";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 40;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 20;
/// Multiple of the frame delay the fully revealed frame is held for
pub const FINAL_FRAME_HOLD_FACTOR: u32 = 25;
/// Longest delay a GIF frame can store, 65535 hundredths of a second
pub const MAX_GIF_DELAY_MS: u32 = 655_350;
/// Longest accepted frame delay, leaving room for the final frame hold
pub const MAX_FRAME_DELAY_MS: u32 = MAX_GIF_DELAY_MS / FINAL_FRAME_HOLD_FACTOR;
/// Extension appended to an animation while it is still being written
pub const PARTIAL_OUTPUT_EXTENSION: &str = "part";

/// Source image extensions accepted by the command-line tool
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Parameters fixed for the lifetime of a refinement engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealConfig {
    /// Grid side length, a power of two
    pub side_length: u32,
    /// Seed for the area-weighted selector
    pub seed: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            side_length: DEFAULT_SIDE_LENGTH,
            seed: DEFAULT_SEED,
        }
    }
}

impl RevealConfig {
    /// Validate the configuration and return the maximum detail level
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the side length is rejected by
    /// [`validate_side_length`]
    pub fn validate(&self) -> Result<u8> {
        validate_side_length(self.side_length)
    }
}

/// Check a grid side length and return its maximum detail level `log2(side_length)`
///
/// # Errors
///
/// Returns a configuration error if the side length is zero, not a power of
/// two, or larger than [`MAX_SIDE_LENGTH`]
pub fn validate_side_length(side_length: u32) -> Result<u8> {
    if !side_length.is_power_of_two() {
        return Err(invalid_parameter(
            "side_length",
            &side_length,
            &"must be a power of two",
        ));
    }
    if side_length > MAX_SIDE_LENGTH {
        return Err(invalid_parameter(
            "side_length",
            &side_length,
            &format!("must not exceed {MAX_SIDE_LENGTH}"),
        ));
    }
    Ok(side_length.trailing_zeros() as u8)
}
