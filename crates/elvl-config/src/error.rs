//! Errors from reading and writing `config.ron`.

use std::path::PathBuf;

/// Why the region tool's settings could not be loaded or saved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file or its directory could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file or its directory could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        /// File or directory that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("invalid settings in {}: {source}", .path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser error with line and column.
        #[source]
        source: ron::error::SpannedError,
    },

    /// The settings could not be rendered as RON.
    #[error("cannot serialize settings: {0}")]
    Serialize(#[source] ron::Error),
}
