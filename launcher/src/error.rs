use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LauncherError>;

/// Failures that abort the launcher before (or instead of) running the child.
///
/// Every variant is a packaging or build problem: none of them is retried.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Couldn't open MANIFEST file: {path}: {source}")]
    ManifestOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Wrong MANIFEST format at line {line_number}: {line}")]
    ManifestLine { line_number: usize, line: String },

    #[error("Rlocation failed on {0}, path doesn't exist in MANIFEST file")]
    RlocationNotFound(String),

    #[error("Cannot find key \"{0}\" from launch data")]
    LaunchInfoKeyMissing(String),

    #[error("Duplicate key \"{0}\" in launch data")]
    LaunchInfoDuplicateKey(String),

    #[error("Invalid launch data: {0}")]
    LaunchDataCorrupt(String),

    #[error("Command line too long ({len} >= {max}): {cmdline}")]
    CommandLineTooLong {
        cmdline: String,
        len: usize,
        max: usize,
    },

    #[error("Failed to wait for child process: {0}")]
    ChildWait(#[source] io::Error),

    #[error("Failed to write launcher command: {0}")]
    Stdout(#[source] io::Error),

    #[error("No command line arguments available (argv[0] is missing)")]
    MissingArgv0,

    #[error("argv[0] is not valid UTF-8: {0:?}")]
    NonUtf8Argv0(OsString),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
