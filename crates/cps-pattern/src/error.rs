//! Error types for the cps-pattern crate.
//!
//! Rendering itself is total for valid sizes; the only failure modes are an
//! unusable pixel size and filesystem errors while exporting.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while rendering or exporting an identifier pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The requested pixel size cannot hold one pixel per module.
    #[error("pattern size {size} is below the minimum of {minimum} pixels")]
    SizeTooSmall {
        /// Requested image size in pixels.
        size: u32,
        /// Smallest accepted image size in pixels.
        minimum: u32,
    },

    /// The export directory could not be opened.
    #[error("failed to open export directory '{path}': {message}")]
    OpenDirError {
        /// Directory the caller asked to export into.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The exported image could not be written.
    #[error("failed to write pattern file '{path}': {message}")]
    WriteError {
        /// Path of the file being written, relative to the export directory.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}
