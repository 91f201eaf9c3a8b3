//! Command-line driver, rendering and shared error handling

/// Command-line interface and batch file processing
pub mod cli;
/// Engine constants and runtime configuration
pub mod configuration;
/// Error types and context helpers
pub mod error;
/// Source image loading and still image export
pub mod image;
/// Multi-file progress display
pub mod progress;
/// CPU renderer and animated GIF capture
pub mod visualization;
