//! Errors raised while setting up logging

use std::io;
use std::path::PathBuf;

/// Logging could not be initialized
///
/// Once a [`crate::Logger`] exists, logging itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Error creating log folder {}: {source}", .path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error opening log file {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInstalled,
}
