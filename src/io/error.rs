//! Error types and context management for reveal operations

use std::fmt;
use std::path::{Path, PathBuf};

const UNKNOWN_PATH: &str = "<unknown>";

/// Main error type for all reveal operations
#[derive(Debug)]
pub enum RevealError {
    /// Grid or tool parameter failed validation
    Configuration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Tree operation applied to a node in the wrong state
    ///
    /// Splitting an interior node or a unit region lands here. Always
    /// indicates a broken invariant in the caller.
    InvalidOperation {
        /// Name of the rejected operation
        operation: &'static str,
        /// Description of the offending node state
        reason: String,
    },

    /// Tree, frontier and detail buffer disagree
    InvalidState {
        /// Tick during which the inconsistency surfaced
        tick: Option<u64>,
        /// Description of the inconsistency
        reason: String,
    },

    /// Failed to load a source image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to encode or save rendered output
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Target is not something the command-line tool can process
    UnsupportedInput {
        /// Offending path
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },
}

impl fmt::Display for RevealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid configuration '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidOperation { operation, reason } => {
                write!(f, "Invalid operation '{operation}': {reason}")
            }
            Self::InvalidState { tick, reason } => match tick {
                Some(tick) => write!(f, "Invalid state at tick {tick}: {reason}"),
                None => write!(f, "Invalid state: {reason}"),
            },
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::UnsupportedInput { path, reason } => {
                write!(f, "Unsupported input '{}': {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for RevealError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for reveal results
pub type Result<T> = std::result::Result<T, RevealError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Engine tick being executed
    pub tick: Option<u64>,
    /// File being processed
    pub path: Option<PathBuf>,
}

/// Enriches errors with engine and file state
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Stamp the current tick onto state errors
    ///
    /// # Errors
    ///
    /// Propagates the original error with the tick applied
    fn with_tick(self, tick: u64) -> Result<T>;

    /// Replace placeholder paths on file errors
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<RevealError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                RevealError::InvalidState { tick, .. } => {
                    if context.tick.is_some() {
                        *tick = context.tick;
                    }
                }
                RevealError::ImageLoad { path, .. }
                | RevealError::ImageExport { path, .. }
                | RevealError::FileSystem { path, .. } => {
                    if let Some(known) = &context.path {
                        if path.as_os_str() == UNKNOWN_PATH {
                            path.clone_from(known);
                        }
                    }
                }
                _ => {}
            }
            error
        })
    }

    fn with_tick(self, tick: u64) -> Result<T> {
        self.with_context(ErrorContext {
            tick: Some(tick),
            ..Default::default()
        })
    }

    fn with_path(self, path: &Path) -> Result<T> {
        self.with_context(ErrorContext {
            path: Some(path.to_path_buf()),
            ..Default::default()
        })
    }
}

impl From<image::ImageError> for RevealError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<std::io::Error> for RevealError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from(UNKNOWN_PATH),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> RevealError {
    RevealError::Configuration {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid operation error
pub fn invalid_operation(operation: &'static str, reason: &impl ToString) -> RevealError {
    RevealError::InvalidOperation {
        operation,
        reason: reason.to_string(),
    }
}

/// Create an invalid state error without tick information
pub fn invalid_state(reason: &impl ToString) -> RevealError {
    RevealError::InvalidState {
        tick: None,
        reason: reason.to_string(),
    }
}

/// Create an unsupported input error
pub fn unsupported_input(path: &Path, reason: &impl ToString) -> RevealError {
    RevealError::UnsupportedInput {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
