//! Starting the target program and passing its exit code through.

use std::ffi::OsString;
use std::io::{self, Write};

use tracing::debug;

use crate::cmdline::CommandLine;
use crate::error::{LauncherError, Result};
use crate::platform;

/// Launcher exit status; the child's own code on the normal path.
pub type ExitCode = i32;

/// Reserved flag that dumps the would-be command instead of launching it.
pub const PRINT_LAUNCHER_COMMAND: &str = "--print_launcher_command";

/// Exit code used when the OS gives no error number for a failed start.
const UNKNOWN_START_FAILURE: ExitCode = 1;

/// How a launch attempt ended.
///
/// [`LaunchOutcome::exit_code`] collapses this into the launcher's own exit
/// status, where a start failure and a child exiting with the same number are
/// indistinguishable. Library callers can match on the variant instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    PrintedCommand,
    Exited(ExitCode),
    StartFailed { code: ExitCode, reason: String },
}

impl LaunchOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LaunchOutcome::PrintedCommand => 0,
            LaunchOutcome::Exited(code) => *code,
            LaunchOutcome::StartFailed { code, .. } => *code,
        }
    }
}

/// What the child needs on top of the inherited environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildEnvironment {
    vars: Vec<(&'static str, String)>,
}

impl ChildEnvironment {
    pub fn new(vars: Vec<(&'static str, String)>) -> Self {
        Self { vars }
    }

    pub fn vars(&self) -> &[(&'static str, String)] {
        &self.vars
    }
}

/// Writes the executable and every argument, one per line, when
/// `--print_launcher_command` is among the arguments. Returns whether it did.
///
/// Arguments are written as their raw bytes.
pub fn print_launcher_command(
    out: &mut dyn Write,
    executable: &str,
    arguments: &[OsString],
) -> io::Result<bool> {
    if !arguments.iter().any(|arg| arg == PRINT_LAUNCHER_COMMAND) {
        return Ok(false);
    }
    writeln!(out, "{executable}")?;
    for arg in arguments {
        out.write_all(arg.as_encoded_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(true)
}

/// Run `executable` with `arguments` and wait for it to finish.
///
/// The runfiles variables in `env` are set on the child only; the launcher's
/// own environment is left alone. There is no timeout: the launcher lives
/// exactly as long as its child.
pub fn launch_process(
    env: &ChildEnvironment,
    executable: &str,
    arguments: &[OsString],
    suppress_output: bool,
) -> Result<LaunchOutcome> {
    if print_launcher_command(&mut io::stdout().lock(), executable, arguments)
        .map_err(LauncherError::Stdout)?
    {
        return Ok(LaunchOutcome::PrintedCommand);
    }

    let cmdline = CommandLine::build(executable, arguments)?;
    let display = cmdline.to_string();

    let mut command = platform::child_command(cmdline, suppress_output);
    for (name, value) in env.vars() {
        debug!(name, value = value.as_str(), "exporting to child");
        command.env(name, value);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            let code = err.raw_os_error().unwrap_or(UNKNOWN_START_FAILURE);
            eprintln!("LAUNCHER ERROR: Cannot launch process: {display}\nReason: {err}");
            return Ok(LaunchOutcome::StartFailed {
                code,
                reason: err.to_string(),
            });
        }
    };

    let status = child.wait().map_err(LauncherError::ChildWait)?;
    let code = platform::exit_code(status);
    debug!(code, "child exited");
    Ok(LaunchOutcome::Exited(code))
}
