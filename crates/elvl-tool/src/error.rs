//! Errors reported by the command-line tool.

use std::path::PathBuf;

use elvl_region::DecodeError;

/// Anything that stops a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The input is not a valid region.
    #[error("{}: {source}", .path.display())]
    Decode {
        /// Region file.
        path: PathBuf,
        /// What the decoder rejected.
        #[source]
        source: DecodeError,
    },

    /// The RON input does not describe a region.
    #[error("{}: {source}", .path.display())]
    Parse {
        /// RON file.
        path: PathBuf,
        /// Parser error with position.
        #[source]
        source: ron::error::SpannedError,
    },

    /// A region could not be rendered as RON.
    #[error("failed to serialize region: {0}")]
    Serialize(#[source] ron::Error),

    /// Re-encoding changed the region.
    #[error("{}: round trip changed {}", .path.display(), .fields.join(", "))]
    RoundTripMismatch {
        /// Region file.
        path: PathBuf,
        /// Fields that differ after decode, encode, decode.
        fields: Vec<&'static str>,
    },
}
