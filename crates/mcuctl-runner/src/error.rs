//! Error types for the runner.

use std::path::PathBuf;

use mcuctl_link::LinkError;
use thiserror::Error;

/// Errors that end a runner session.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The batch file could not be read.
    #[error("cannot read batch file `{path}`: {source}")]
    BatchFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening or talking to the board failed.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The Ctrl-C handler could not be installed.
    #[error("cannot install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
