//! CLI entry point for the quadtree reveal renderer

use clap::Parser;
use quadreveal::io::cli::{Cli, FileProcessor};

fn main() -> quadreveal::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
