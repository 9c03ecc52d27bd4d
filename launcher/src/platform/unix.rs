use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};

use crate::cmdline::CommandLine;

/// Executables carry no suffix here, so argv[0] is already the binary path.
pub fn binary_path_with_extension(argv0: &str) -> String {
    argv0.to_string()
}

pub fn child_command(cmdline: CommandLine, suppress_output: bool) -> Command {
    let mut command = Command::new(cmdline.executable());
    command.args(cmdline.arguments());
    if suppress_output {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }
    command
}

/// A child killed by a signal reports `128 + signal`, like a shell does.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}
