//! Command-line interface for batch reveal rendering

use crate::algorithm::refinement::{RefineKind, RefineOutcome, RefinementEngine};
use crate::io::configuration::{
    DEFAULT_MAX_DIMENSION, DEFAULT_SEED, DEFAULT_SIDE_LENGTH, DEFAULT_TICKS_PER_FRAME,
    DETAIL_MAP_SUFFIX, GIF_FRAME_DELAY_MS, MAX_FRAME_DELAY_MS, OUTPUT_SUFFIX, RevealConfig,
};
use crate::io::error::{Result, WithContext, invalid_parameter, unsupported_input};
use crate::io::image::{export_detail_map, is_supported_image, load_source_image};
use crate::io::progress::ProgressManager;
use crate::io::visualization::{RevealAnimation, RevealRenderer};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

// Bars are redrawn at most this often during a reveal
const PROGRESS_UPDATE_TICKS: u64 = 256;

#[derive(Parser, Debug)]
#[command(name = "quadreveal")]
#[command(
    author,
    version,
    about = "Render progressive quadtree reveals of images as animated GIFs"
)]
/// Command-line arguments for the reveal tool
pub struct Cli {
    /// Input image (png, jpg) or directory of images
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Random seed for reproducible reveals
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Grid side length, a power of two
    #[arg(short = 'l', long, default_value_t = DEFAULT_SIDE_LENGTH)]
    pub side_length: u32,

    /// Sharpening ticks between animation frames
    #[arg(short, long, default_value_t = DEFAULT_TICKS_PER_FRAME)]
    pub ticks_per_frame: usize,

    /// Delay between animation frames in milliseconds
    #[arg(short = 'd', long, default_value_t = GIF_FRAME_DELAY_MS)]
    pub frame_delay_ms: u32,

    /// Longest output edge in pixels; larger sources are downscaled
    #[arg(short, long, default_value_t = DEFAULT_MAX_DIMENSION)]
    pub max_dimension: u32,

    /// Stop after this many ticks and show the unquantized image
    #[arg(long, value_name = "TICKS")]
    pub stop_after: Option<u64>,

    /// Also write the detail buffer at the stopping point as a grayscale PNG
    #[arg(long)]
    pub detail_map: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Engine configuration selected by the arguments
    pub const fn reveal_config(&self) -> RevealConfig {
        RevealConfig {
            side_length: self.side_length,
            seed: self.seed,
        }
    }

    /// Validate argument combinations clap cannot express
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero frame interval or output
    /// dimension, a frame delay above [`MAX_FRAME_DELAY_MS`], or an
    /// unacceptable side length
    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_frame == 0 {
            return Err(invalid_parameter(
                "ticks_per_frame",
                &self.ticks_per_frame,
                &"must be at least 1",
            ));
        }
        if self.frame_delay_ms > MAX_FRAME_DELAY_MS {
            return Err(invalid_parameter(
                "frame_delay_ms",
                &self.frame_delay_ms,
                &format!("must not exceed {MAX_FRAME_DELAY_MS}"),
            ));
        }
        if self.max_dimension == 0 {
            return Err(invalid_parameter(
                "max_dimension",
                &self.max_dimension,
                &"must be at least 1",
            ));
        }
        self.reveal_config().validate()?;
        Ok(())
    }
}

/// Orchestrates batch reveal rendering with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if argument validation, target collection, or any
    /// file's reveal fails
    pub fn process(&mut self) -> Result<()> {
        self.cli.validate()?;
        let files = self.collect_files()?;

        if files.is_empty() {
            log::info!("nothing to reveal in {}", self.cli.target.display());
            return Ok(());
        }

        // One grid for the whole batch, reset for each image
        let mut engine = RefinementEngine::from_config(&self.cli.reveal_config())?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(&mut engine, file, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Image files selected by the target argument, sorted by path
    ///
    /// # Errors
    ///
    /// Returns an error if the target is an unsupported file, does not exist,
    /// or the directory cannot be read
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !is_supported_image(target) {
                return Err(unsupported_input(target, &"expected a png or jpg image"));
            }
            Ok(if self.should_process_file(target) {
                vec![target.clone()]
            } else {
                vec![]
            })
        } else if target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).with_path(target)? {
                let path = entry.with_path(target)?.path();
                if is_supported_image(&path)
                    && !Self::is_generated(&path)
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(unsupported_input(
                target,
                &"target must be an image file or directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = Self::get_output_path(input_path);
        if output_path.exists() {
            log::info!("skipping {} (output exists)", input_path.display());
            false
        } else {
            true
        }
    }

    fn process_file(
        &mut self,
        engine: &mut RefinementEngine,
        input_path: &Path,
        index: usize,
    ) -> Result<()> {
        let start_time = Instant::now();
        let output_path = Self::get_output_path(input_path);
        let tick_limit = self.cli.stop_after.unwrap_or(u64::MAX);

        engine.reset();
        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path, engine.total_ticks().min(tick_limit));
        }

        let renderer = RevealRenderer::new(load_source_image(input_path, self.cli.max_dimension)?);
        let mut animation = RevealAnimation::create(&output_path, self.cli.frame_delay_ms)?;
        animation.push_frame(renderer.render(engine.buffer()))?;

        let mut since_frame = 0;
        while engine.progress().ticks < tick_limit {
            let outcome = engine.refine_one()?;
            let RefineOutcome::Refined(info) = outcome else {
                break;
            };

            if info.kind == RefineKind::Sharpened {
                since_frame += 1;
                if since_frame == self.cli.ticks_per_frame {
                    animation.push_frame(renderer.render(engine.buffer()))?;
                    since_frame = 0;
                }
            }

            let ticks = engine.progress().ticks;
            if ticks % PROGRESS_UPDATE_TICKS == 0 {
                if let Some(ref mut pm) = self.progress_manager {
                    pm.update_ticks(index, ticks);
                }
            }
        }

        if since_frame > 0 {
            animation.push_frame(renderer.render(engine.buffer()))?;
        }
        let final_frame = if engine.is_resolved() {
            renderer.render(engine.buffer())
        } else {
            log::debug!(
                "stopped {} after {} ticks, revealing",
                input_path.display(),
                engine.progress().ticks
            );
            renderer.render_revealed()
        };
        let frames = animation.finish(final_frame)?;
        log::debug!("wrote {frames} frames to {}", output_path.display());

        if self.cli.detail_map {
            export_detail_map(engine.buffer(), &Self::get_detail_map_path(input_path))?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index, start_time.elapsed());
        }

        Ok(())
    }

    fn is_generated(path: &Path) -> bool {
        path.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(DETAIL_MAP_SUFFIX))
    }

    /// Animated GIF written for an input image
    pub fn get_output_path(input_path: &Path) -> PathBuf {
        Self::sibling_path(input_path, OUTPUT_SUFFIX, "gif")
    }

    /// Detail map PNG written for an input image
    pub fn get_detail_map_path(input_path: &Path) -> PathBuf {
        Self::sibling_path(input_path, DETAIL_MAP_SUFFIX, "png")
    }

    fn sibling_path(input_path: &Path, suffix: &str, extension: &str) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let name = format!("{}{suffix}.{extension}", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(name)
        } else {
            PathBuf::from(name)
        }
    }
}
