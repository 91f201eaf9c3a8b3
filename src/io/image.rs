//! Source image loading and still image export

use crate::io::configuration::SUPPORTED_EXTENSIONS;
use crate::io::error::{Result, RevealError};
use crate::spatial::DetailBuffer;
use image::{GrayImage, Luma, RgbaImage, imageops::FilterType};
use std::path::Path;

/// Test if a path carries one of the supported image extensions
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Load an image and shrink it so neither side exceeds `max_dimension`
///
/// Images already within bounds keep their size. Aspect ratio is preserved.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_source_image(path: &Path, max_dimension: u32) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| RevealError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;

    let image = if image.width() > max_dimension || image.height() > max_dimension {
        log::debug!(
            "downscaling {} from {}x{} to fit {max_dimension}px",
            path.display(),
            image.width(),
            image.height()
        );
        image.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        image
    };

    Ok(image.to_rgba8())
}

/// Render the detail buffer as a grayscale map, white for `max_level`
///
/// A buffer with `max_level` 0 renders black.
pub fn detail_map_image(buffer: &DetailBuffer) -> GrayImage {
    let side = buffer.side_length();
    let max_level = u32::from(buffer.max_level().max(1));
    GrayImage::from_fn(side, side, |x, y| {
        let level = u32::from(buffer.level(x, y).unwrap_or(0));
        Luma([(level * 255 / max_level) as u8])
    })
}

/// Save the detail buffer as a grayscale PNG
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_detail_map(buffer: &DetailBuffer, output_path: &Path) -> Result<()> {
    create_parent_dir(output_path)?;
    detail_map_image(buffer)
        .save(output_path)
        .map_err(|e| RevealError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}

pub(crate) fn create_parent_dir(output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(parent).map_err(|e| RevealError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    Ok(())
}
