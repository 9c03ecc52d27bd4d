use std::ffi::OsString;
use std::path::MAIN_SEPARATOR;

use crate::error::{LauncherError, Result};
use crate::host::Host;
use crate::launch_info::{self, LaunchInfo};
use crate::platform;
use crate::process::{self, ChildEnvironment, LaunchOutcome};
use crate::runfiles::Runfiles;

/// Everything a launcher knows about itself, gathered once at startup.
pub struct BinaryLauncher {
    launch_info: LaunchInfo,
    runfiles: Runfiles,
    binary: String,
    commandline_arguments: Vec<OsString>,
}

impl BinaryLauncher {
    /// Capture argv, read the workspace name from `launch_info` and discover
    /// runfiles for the binary named by `argv[0]`.
    ///
    /// `argv[0]` has to be UTF-8 since runfiles paths are derived from it;
    /// the remaining arguments are kept as given.
    pub fn new(launch_info: LaunchInfo, args: Vec<OsString>, host: &dyn Host) -> Result<Self> {
        let binary = argv0(&args)?;
        let workspace_name = launch_info.get(launch_info::WORKSPACE_NAME)?;
        let runfiles = Runfiles::discover(host, &binary, workspace_name)?;

        Ok(Self {
            launch_info,
            runfiles,
            binary,
            commandline_arguments: args,
        })
    }

    /// Assemble a launcher from parts that were discovered elsewhere.
    pub fn from_parts(
        launch_info: LaunchInfo,
        runfiles: Runfiles,
        args: Vec<OsString>,
    ) -> Result<Self> {
        let binary = argv0(&args)?;
        Ok(Self {
            launch_info,
            runfiles,
            binary,
            commandline_arguments: args,
        })
    }

    pub fn rlocation(&self, path: &str, need_workspace_name: bool) -> Result<String> {
        self.runfiles.rlocation(path, need_workspace_name)
    }

    pub fn get_launch_info_by_key(&self, key: &str) -> Result<&str> {
        self.launch_info.get(key)
    }

    pub fn launch_info(&self) -> &LaunchInfo {
        &self.launch_info
    }

    pub fn runfiles(&self) -> &Runfiles {
        &self.runfiles
    }

    pub fn commandline_arguments(&self) -> &[OsString] {
        &self.commandline_arguments
    }

    /// `<binary>.runfiles` next to this launcher, with native separators.
    pub fn runfiles_path(&self) -> String {
        let binary = platform::binary_path_with_extension(&self.binary);
        format!("{binary}.runfiles")
            .chars()
            .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
            .collect()
    }

    /// Run `executable`, exporting this launcher's runfiles strategy so a
    /// nested launcher resolves the same files.
    pub fn launch_process(
        &self,
        executable: &str,
        arguments: &[OsString],
        suppress_output: bool,
    ) -> Result<LaunchOutcome> {
        let env = ChildEnvironment::new(self.runfiles.child_env());
        process::launch_process(&env, executable, arguments, suppress_output)
    }
}

fn argv0(args: &[OsString]) -> Result<String> {
    let argv0 = args.first().ok_or(LauncherError::MissingArgv0)?;
    argv0
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| LauncherError::NonUtf8Argv0(argv0.clone()))
}
