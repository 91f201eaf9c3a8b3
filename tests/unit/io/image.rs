//! Tests for source image loading and still image export

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use quadreveal::RevealError;
    use quadreveal::io::image::{
        detail_map_image, export_detail_map, is_supported_image, load_source_image,
    };
    use quadreveal::spatial::{DetailBuffer, Region};
    use std::path::Path;
    use tempfile::TempDir;

    // Tests extension matching is case insensitive and limited to raster formats
    // Verified by matching extensions case sensitively
    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("cat.png")));
        assert!(is_supported_image(Path::new("cat.JPG")));
        assert!(is_supported_image(Path::new("dir/cat.jpeg")));
        assert!(!is_supported_image(Path::new("cat.gif")));
        assert!(!is_supported_image(Path::new("cat")));
        assert!(!is_supported_image(Path::new("png")));
    }

    // Tests large sources are downscaled with their aspect ratio kept
    // Verified by resizing to a square
    #[test]
    fn test_load_downscales_large_images() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("wide.png");
        RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255]))
            .save(&path)
            .expect("write source");

        let loaded = load_source_image(&path, 16).expect("source loads");
        assert_eq!(loaded.dimensions(), (16, 8));

        let untouched = load_source_image(&path, 64).expect("source loads");
        assert_eq!(untouched.dimensions(), (40, 20));
        assert_eq!(untouched.get_pixel(5, 5), &Rgba([10, 20, 30, 255]));
    }

    // Tests missing sources report an image load error with the path
    // Verified by mapping load failures to file system errors
    #[test]
    fn test_load_missing_image() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("missing.png");

        let error = load_source_image(&path, 64).expect_err("file does not exist");

        match error {
            RevealError::ImageLoad { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error {other:?}"),
        }
    }

    // Tests detail levels map linearly onto gray values
    // Verified by scaling by side length instead of maximum level
    #[test]
    fn test_detail_map_image_levels() {
        let mut buffer = DetailBuffer::new(4, 2);
        buffer
            .sharpen(Region::new(0, 0, 4), 2)
            .expect("uniform region");
        buffer
            .sharpen(Region::new(2, 2, 2), 1)
            .expect("uniform region");

        let map = detail_map_image(&buffer);

        assert_eq!(map.dimensions(), (4, 4));
        assert_eq!(map.get_pixel(0, 0).0, [127]);
        assert_eq!(map.get_pixel(3, 3).0, [0]);

        let blurred = detail_map_image(&DetailBuffer::new(2, 1));
        assert!(blurred.pixels().all(|pixel| pixel.0 == [255]));

        let single = detail_map_image(&DetailBuffer::new(1, 0));
        assert_eq!(single.get_pixel(0, 0).0, [0]);
    }

    // Tests detail map export creates missing parent directories
    // Verified by removing directory creation
    #[test]
    fn test_export_detail_map_creates_parent_dirs() {
        let dir = TempDir::new().expect("temp dir");
        let map_path = dir.path().join("nested/maps/detail.png");
        let mut buffer = DetailBuffer::new(4, 2);
        buffer
            .sharpen(Region::new(0, 0, 4), 2)
            .expect("uniform region");

        export_detail_map(&buffer, &map_path).expect("map export");

        let map = image::open(&map_path).expect("map readable").to_luma8();
        assert_eq!(map, detail_map_image(&buffer));
    }
}
