//! Tests for command-line parsing and batch file processing

#[cfg(test)]
mod tests {
    use clap::Parser;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba, RgbaImage};
    use quadreveal::RevealError;
    use quadreveal::io::cli::{Cli, FileProcessor};
    use quadreveal::io::configuration::{
        DEFAULT_MAX_DIMENSION, DEFAULT_SEED, DEFAULT_SIDE_LENGTH, DEFAULT_TICKS_PER_FRAME,
        GIF_FRAME_DELAY_MS, MAX_FRAME_DELAY_MS,
    };
    use std::fs::{self, File};
    use std::io::BufReader;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_image(path: &Path, size: u32) {
        RgbaImage::from_fn(size, size, |x, y| {
            Rgba([(x * 60) as u8, (y * 60) as u8, 90, 255])
        })
        .save(path)
        .expect("write source image");
    }

    fn cli_for(target: &Path, extra: &[&str]) -> Cli {
        let target = target.to_str().expect("utf-8 temp path");
        let mut args = vec!["quadreveal", target];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    fn frame_count(path: &Path) -> usize {
        let file = File::open(path).expect("gif exists");
        let decoder = GifDecoder::new(BufReader::new(file)).expect("valid gif");
        decoder
            .into_frames()
            .collect_frames()
            .expect("frames decode")
            .len()
    }

    // Tests parsing with only the target argument
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(["quadreveal", "test.png"]);

        assert_eq!(cli.target, PathBuf::from("test.png"));
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.side_length, DEFAULT_SIDE_LENGTH);
        assert_eq!(cli.ticks_per_frame, DEFAULT_TICKS_PER_FRAME);
        assert_eq!(cli.frame_delay_ms, GIF_FRAME_DELAY_MS);
        assert_eq!(cli.max_dimension, DEFAULT_MAX_DIMENSION);
        assert_eq!(cli.stop_after, None);
        assert!(!cli.detail_map);
        assert!(cli.should_show_progress());
        assert!(cli.skip_existing());
        cli.validate().expect("defaults are valid");
    }

    // Tests parsing with every option set
    // Verified by swapping short flags between options
    #[test]
    fn test_cli_parse_all_args() {
        let cli = Cli::parse_from([
            "quadreveal",
            "photos",
            "-s",
            "7",
            "-l",
            "64",
            "-t",
            "3",
            "-d",
            "25",
            "-m",
            "128",
            "--stop-after",
            "100",
            "--detail-map",
            "--quiet",
            "--no-skip",
        ]);

        assert_eq!(cli.target, PathBuf::from("photos"));
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.side_length, 64);
        assert_eq!(cli.ticks_per_frame, 3);
        assert_eq!(cli.frame_delay_ms, 25);
        assert_eq!(cli.max_dimension, 128);
        assert_eq!(cli.stop_after, Some(100));
        assert!(cli.detail_map);
        assert!(!cli.should_show_progress());
        assert!(!cli.skip_existing());

        let config = cli.reveal_config();
        assert_eq!(config.side_length, 64);
        assert_eq!(config.seed, 7);
    }

    // Tests argument combinations clap accepts but the tool rejects
    // Verified by skipping validation before processing
    #[test]
    fn test_cli_validate_rejects() {
        let slow = (MAX_FRAME_DELAY_MS + 1).to_string();
        for extra in [
            ["-t", "0"],
            ["-m", "0"],
            ["-l", "48"],
            ["-d", slow.as_str()],
            ["-d", "200000000"],
        ] {
            let cli = Cli::parse_from(["quadreveal", "x.png", extra[0], extra[1]]);
            assert!(
                matches!(cli.validate(), Err(RevealError::Configuration { .. })),
                "{extra:?} accepted"
            );
        }
    }

    // Tests output paths sit next to their input
    // Verified by dropping the suffix from generated names
    #[test]
    fn test_output_paths() {
        assert_eq!(
            FileProcessor::get_output_path(Path::new("dir/cat.png")),
            PathBuf::from("dir/cat_reveal.gif")
        );
        assert_eq!(
            FileProcessor::get_detail_map_path(Path::new("dir/cat.jpg")),
            PathBuf::from("dir/cat_detail.png")
        );
        assert_eq!(
            FileProcessor::get_output_path(Path::new("cat.png")),
            PathBuf::from("cat_reveal.gif")
        );
    }

    // Tests directory collection filters, skips and sorts
    // Verified by including generated detail maps
    #[test]
    fn test_collect_files_from_directory() {
        let dir = TempDir::new().expect("temp dir");
        for name in ["b.jpg", "a.png", "a_detail.png", "notes.txt", "b_reveal.gif"] {
            fs::write(dir.path().join(name), b"").expect("write file");
        }

        let skipping = FileProcessor::new(cli_for(dir.path(), &["-q"]));
        let files = skipping.collect_files().expect("directory readable");
        assert_eq!(files, vec![dir.path().join("a.png")]);

        let all = FileProcessor::new(cli_for(dir.path(), &["-q", "-n"]));
        let files = all.collect_files().expect("directory readable");
        assert_eq!(files, vec![dir.path().join("a.png"), dir.path().join("b.jpg")]);
    }

    // Tests unsupported and missing targets are rejected
    // Verified by treating every file as an image
    #[test]
    fn test_collect_files_rejects_bad_targets() {
        let dir = TempDir::new().expect("temp dir");
        let text = dir.path().join("notes.txt");
        fs::write(&text, b"hello").expect("write file");

        let processor = FileProcessor::new(cli_for(&text, &["-q"]));
        assert!(matches!(
            processor.collect_files(),
            Err(RevealError::UnsupportedInput { .. })
        ));

        let missing = FileProcessor::new(cli_for(&dir.path().join("missing"), &["-q"]));
        assert!(matches!(
            missing.collect_files(),
            Err(RevealError::UnsupportedInput { .. })
        ));
    }

    // Tests a full reveal writes one frame per sharpening tick plus the ends
    // Verified by capturing frames on retirement ticks
    #[test]
    fn test_process_full_reveal() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("tiny.png");
        write_image(&source, 4);

        let mut processor = FileProcessor::new(cli_for(&source, &["-q", "-l", "4", "-t", "1"]));
        processor.process().expect("reveal succeeds");

        // Initial frame, five sharpening ticks, final frame
        let output = dir.path().join("tiny_reveal.gif");
        assert_eq!(frame_count(&output), 7);
        assert!(!dir.path().join("tiny_detail.png").exists());
    }

    // Tests stopping early writes the detail map at the stopping point
    // Verified by exporting the map after a full reveal
    #[test]
    fn test_process_stop_after_with_detail_map() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("early.png");
        write_image(&source, 4);

        let mut processor = FileProcessor::new(cli_for(
            &source,
            &["-q", "-l", "4", "--stop-after", "1", "--detail-map"],
        ));
        processor.process().expect("reveal succeeds");

        assert!(dir.path().join("early_reveal.gif").exists());
        let map = image::open(dir.path().join("early_detail.png"))
            .expect("detail map written")
            .to_luma8();
        assert_eq!(map.dimensions(), (4, 4));
        assert!(map.pixels().all(|pixel| pixel.0 == [127]));
    }

    // Tests existing outputs are skipped unless asked otherwise
    // Verified by ignoring the skip flag
    #[test]
    fn test_process_skips_existing_output() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("done.png");
        write_image(&source, 4);
        let output = dir.path().join("done_reveal.gif");
        fs::write(&output, b"placeholder").expect("write placeholder");

        let mut processor = FileProcessor::new(cli_for(&source, &["-q", "-l", "4"]));
        processor.process().expect("nothing to do");
        assert_eq!(fs::read(&output).expect("placeholder kept"), b"placeholder");

        let mut forced = FileProcessor::new(cli_for(&source, &["-q", "-l", "4", "-n"]));
        forced.process().expect("reveal succeeds");
        assert!(frame_count(&output) >= 2);
    }

    // Tests the longest accepted frame delay still processes
    // Verified by rejecting the bound itself
    #[test]
    fn test_cli_accepts_max_frame_delay() {
        let delay = MAX_FRAME_DELAY_MS.to_string();
        let cli = Cli::parse_from(["quadreveal", "x.png", "-d", delay.as_str()]);

        cli.validate().expect("bound is inclusive");
    }

    // Tests a leftover partial animation neither blocks nor survives a run
    // Verified by skipping inputs whose partial output exists
    #[test]
    fn test_process_replaces_partial_output() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("crashed.png");
        write_image(&source, 4);
        let partial = dir.path().join("crashed_reveal.gif.part");
        fs::write(&partial, b"truncated").expect("write partial");

        let mut processor = FileProcessor::new(cli_for(&source, &["-q", "-l", "4"]));
        processor.process().expect("reveal succeeds");

        assert!(frame_count(&dir.path().join("crashed_reveal.gif")) >= 2);
        assert!(!partial.exists());
    }
}
