//! CPU renderer for the detail buffer and streaming GIF capture

use crate::io::configuration::{
    FINAL_FRAME_HOLD_FACTOR, MAX_GIF_DELAY_MS, PARTIAL_OUTPUT_EXTENSION, VIEWER_MIN_FRAME_DELAY_MS,
};
use crate::io::error::{Result, RevealError, invalid_state};
use crate::io::image::create_parent_dir;
use crate::spatial::DetailBuffer;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Samples a source image through a detail buffer
///
/// Each output pixel is mapped onto the grid, its grid coordinates are floored
/// to a multiple of `2^level`, and the source is sampled at that corner. A
/// buffer of all zeros reproduces the source at grid resolution.
pub struct RevealRenderer {
    source: RgbaImage,
}

impl RevealRenderer {
    /// Create a renderer for the given source image
    pub const fn new(source: RgbaImage) -> Self {
        Self { source }
    }

    /// Output dimensions (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    /// Render the source quantized by the detail buffer
    pub fn render(&self, buffer: &DetailBuffer) -> RgbaImage {
        let (width, height) = self.source.dimensions();
        let side = u64::from(buffer.side_length());

        RgbaImage::from_fn(width, height, |x, y| {
            let grid_x = (u64::from(x) * side / u64::from(width)) as u32;
            let grid_y = (u64::from(y) * side / u64::from(height)) as u32;
            let level = u32::from(buffer.level(grid_x, grid_y).unwrap_or(0));

            let block_x = (grid_x >> level) << level;
            let block_y = (grid_y >> level) << level;

            let sample_x = (u64::from(block_x) * u64::from(width) / side) as u32;
            let sample_y = (u64::from(block_y) * u64::from(height) / side) as u32;
            self.source
                .get_pixel_checked(sample_x.min(width - 1), sample_y.min(height - 1))
                .copied()
                .unwrap_or(Rgba([0, 0, 0, 255]))
        })
    }

    /// The unquantized source, shown when the reveal is cut short
    pub fn render_revealed(&self) -> RgbaImage {
        self.source.clone()
    }
}

/// Streams rendered frames into an animated GIF
///
/// Frames are encoded as they arrive so memory stays bounded by a single
/// frame. When the requested delay is faster than viewers can play, frames are
/// skipped so the apparent animation speed is kept.
///
/// Frames go to a `.part` sibling of the output path, renamed into place by
/// [`RevealAnimation::finish`]. An animation dropped before finishing removes
/// its partial file, so an interrupted reveal never leaves an output behind.
pub struct RevealAnimation {
    encoder: Option<GifEncoder<BufWriter<File>>>,
    path: PathBuf,
    partial_path: PathBuf,
    delay_ms: u32,
    skip_factor: usize,
    offered: usize,
    encoded: usize,
    last_frame: Option<RgbaImage>,
}

impl RevealAnimation {
    /// Create the partial output file and prepare an endlessly looping GIF
    ///
    /// Delays are clamped to what a GIF frame can store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory or file cannot be created
    /// - The GIF header cannot be written
    pub fn create(output_path: &Path, frame_delay_ms: u32) -> Result<Self> {
        create_parent_dir(output_path)?;
        let partial_path = partial_path_for(output_path);
        let file = File::create(&partial_path).map_err(|e| RevealError::FileSystem {
            path: partial_path.clone(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = GifEncoder::new(BufWriter::new(file));
        if let Err(e) = encoder.set_repeat(Repeat::Infinite) {
            drop(encoder);
            remove_partial(&partial_path);
            return Err(RevealError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            });
        }

        let frame_delay_ms = frame_delay_ms.clamp(1, MAX_GIF_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms)
        } else {
            1
        };

        Ok(Self {
            encoder: Some(encoder),
            path: output_path.to_path_buf(),
            partial_path,
            delay_ms: frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS),
            skip_factor: skip_factor as usize,
            offered: 0,
            encoded: 0,
            last_frame: None,
        })
    }

    /// Offer a frame; every `skip_factor`-th frame is encoded
    ///
    /// # Errors
    ///
    /// Returns an error if GIF encoding fails
    pub fn push_frame(&mut self, frame: RgbaImage) -> Result<()> {
        self.offered += 1;
        if self.offered % self.skip_factor == 0 {
            self.encode(frame, self.delay_ms)?;
            self.last_frame = None;
        } else {
            self.last_frame = Some(frame);
        }
        Ok(())
    }

    /// Encode any skipped trailing frame, hold `final_frame` on screen and
    /// move the finished GIF to the output path
    ///
    /// Returns the number of frames written.
    ///
    /// # Errors
    ///
    /// Returns an error if GIF encoding or the final rename fails
    pub fn finish(mut self, final_frame: RgbaImage) -> Result<usize> {
        if let Some(pending) = self.last_frame.take() {
            self.encode(pending, self.delay_ms)?;
        }
        let hold_ms = self
            .delay_ms
            .saturating_mul(FINAL_FRAME_HOLD_FACTOR)
            .min(MAX_GIF_DELAY_MS);
        self.encode(final_frame, hold_ms)?;

        // Dropping the encoder writes the trailer and flushes the file
        drop(self.encoder.take());
        if let Err(e) = std::fs::rename(&self.partial_path, &self.path) {
            remove_partial(&self.partial_path);
            return Err(RevealError::FileSystem {
                path: self.path.clone(),
                operation: "rename partial output",
                source: e,
            });
        }
        Ok(self.encoded)
    }

    /// Frames offered so far, skipped or not
    pub const fn frames_offered(&self) -> usize {
        self.offered
    }

    /// Effective delay between encoded frames
    pub const fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// File frames are written to until the animation is finished
    pub fn partial_path(&self) -> &Path {
        &self.partial_path
    }

    fn encode(&mut self, image: RgbaImage, delay_ms: u32) -> Result<()> {
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(invalid_state(&"animation already finished"));
        };
        let frame = Frame::from_parts(image, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
        encoder
            .encode_frame(frame)
            .map_err(|e| RevealError::ImageExport {
                path: self.path.clone(),
                source: e,
            })?;
        self.encoded += 1;
        Ok(())
    }
}

impl Drop for RevealAnimation {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            drop(encoder);
            remove_partial(&self.partial_path);
        }
    }
}

fn partial_path_for(output_path: &Path) -> PathBuf {
    let mut name = output_path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_OUTPUT_EXTENSION);
    output_path.with_file_name(name)
}

fn remove_partial(partial_path: &Path) {
    if let Err(e) = std::fs::remove_file(partial_path) {
        log::warn!(
            "could not remove unfinished animation {}: {e}",
            partial_path.display()
        );
    }
}
