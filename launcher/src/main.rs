use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use runfiles_launcher::launch_info::{
    LaunchInfo, BINARY_PATH, BINARY_PATH_QUALIFIED, SUPPRESS_OUTPUT,
};
use runfiles_launcher::{BinaryLauncher, ExitCode, LauncherError, Result, SystemHost};
use tracing_subscriber::EnvFilter;

/// Log filter for the launcher's own diagnostics, e.g. `runfiles_launcher=debug`.
const LOG_ENV: &str = "RUNFILES_LAUNCHER_LOG";
const FATAL_EXIT_CODE: ExitCode = 1;

fn main() {
    init_tracing();

    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("LAUNCHER ERROR: {err}");
            process::exit(FATAL_EXIT_CODE);
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<OsString> = std::env::args_os().collect();

    let current_exe = std::env::current_exe().map_err(|source| LauncherError::Io {
        path: args.first().map(PathBuf::from).unwrap_or_default(),
        source,
    })?;
    let launch_info = LaunchInfo::from_executable(&current_exe)?;

    let launcher = BinaryLauncher::new(launch_info, args, &SystemHost)?;

    let info = launcher.launch_info();
    let binary_path = info.get(BINARY_PATH)?;
    let qualified = info.get_optional(BINARY_PATH_QUALIFIED) != Some("0");
    let suppress_output = info.get_optional(SUPPRESS_OUTPUT) == Some("1");

    let executable = launcher.rlocation(binary_path, qualified)?;
    let arguments = &launcher.commandline_arguments()[1..];

    let outcome = launcher.launch_process(&executable, arguments, suppress_output)?;
    Ok(outcome.exit_code())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
