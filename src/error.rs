/*!
 * Error types for seqsplit
 */

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::filter::FilterError;

pub type Result<T> = std::result::Result<T, SplitError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Error)]
pub enum SplitError {
    /// Source file does not exist
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Source exists but cannot be opened or read
    #[error("Source unreadable: {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Requested chunk count cannot be satisfied by the file size
    #[error("Cannot split {size} bytes into {num_chunks} chunks")]
    PlanDegenerate { num_chunks: usize, size: u64 },

    /// No line of the source contains the entry marker
    #[error("No entry marker '{marker}' found in {}", .path.display())]
    NoEntries { path: PathBuf, marker: String },

    /// Prolog holds no element start tag to take the root name from
    #[error("Prolog does not contain a root element start tag")]
    MissingRootElement,

    /// Source does not end with the root closing tag
    #[error("Source does not end with the root closing tag '{expected}'")]
    MissingTrailer { expected: String },

    /// A worker failed while reading its range or writing its output
    #[error("Chunk {index} failed writing {}: {source}", .output.display())]
    Worker {
        index: usize,
        output: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A worker stopped because a sibling failed
    #[error("Chunk {index} cancelled")]
    Cancelled { index: usize },

    /// Exclusion set could not be built
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker pool could not be built
    #[error("Parallel processing error: {0}")]
    Parallel(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SplitError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // Worker failures may leave sibling output on disk
            SplitError::Worker { .. } | SplitError::Cancelled { .. } => EXIT_PARTIAL,
            _ => EXIT_FATAL,
        }
    }

    /// True for the error a worker reports when it was stopped by a sibling
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SplitError::Cancelled { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            SplitError::SourceNotFound(_) | SplitError::SourceUnreadable { .. } => {
                ErrorCategory::Source
            }
            SplitError::PlanDegenerate { .. } => ErrorCategory::Plan,
            SplitError::NoEntries { .. }
            | SplitError::MissingRootElement
            | SplitError::MissingTrailer { .. } => ErrorCategory::Structure,
            SplitError::Worker { .. } | SplitError::Io(_) => ErrorCategory::IoError,
            SplitError::Cancelled { .. } | SplitError::Parallel(_) => ErrorCategory::Concurrency,
            SplitError::Filter(_) | SplitError::Config(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input file missing or unreadable
    Source,
    /// Chunk plan cannot be built
    Plan,
    /// Source layout breaks a structural precondition
    Structure,
    /// Read or write failure
    IoError,
    /// Pool or cancellation errors
    Concurrency,
    /// Bad configuration or exclusion rules
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Source => write!(f, "source"),
            ErrorCategory::Plan => write!(f, "plan"),
            ErrorCategory::Structure => write!(f, "structure"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Concurrency => write!(f, "concurrency"),
            ErrorCategory::Configuration => write!(f, "configuration"),
        }
    }
}
