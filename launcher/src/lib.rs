//! Runfiles-aware launcher for build outputs.
//!
//! A launcher binary is produced per target. At startup it finds the
//! target's runfiles (a manifest or a runfiles directory), reads the launch
//! data the build embedded in it, starts the real program with the runfiles
//! environment exported and exits with the program's exit code.

pub mod cmdline;
pub mod error;
pub mod host;
pub mod launch_info;
pub mod launcher;
pub mod manifest;
pub mod process;
pub mod runfiles;

#[cfg(unix)]
#[path = "platform/unix.rs"]
mod platform;

#[cfg(windows)]
#[path = "platform/windows.rs"]
mod platform;

pub use cmdline::{CommandLine, MAX_CMDLINE_LENGTH};
pub use error::{LauncherError, Result};
pub use host::{Host, SystemHost};
pub use launch_info::LaunchInfo;
pub use launcher::BinaryLauncher;
pub use manifest::ManifestFileMap;
pub use process::{ExitCode, LaunchOutcome, PRINT_LAUNCHER_COMMAND};
pub use runfiles::Runfiles;
