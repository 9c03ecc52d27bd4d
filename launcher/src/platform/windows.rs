use std::os::windows::process::CommandExt;
use std::process::{Command, ExitStatus};

use crate::cmdline::CommandLine;

const CREATE_NO_WINDOW: u32 = 0x0800_0000;
const EXE_EXTENSION: &str = ".exe";

/// argv[0] may omit the `.exe` suffix when the launcher was started from a
/// shell; runfiles live next to the full file name.
pub fn binary_path_with_extension(argv0: &str) -> String {
    if argv0.to_ascii_lowercase().ends_with(EXE_EXTENSION) {
        argv0.to_string()
    } else {
        format!("{argv0}{EXE_EXTENSION}")
    }
}

/// The arguments are handed over as one raw string so that whatever quoting
/// the caller applied reaches the child untouched.
pub fn child_command(cmdline: CommandLine, suppress_output: bool) -> Command {
    let mut command = Command::new(cmdline.executable());
    let raw = cmdline.raw_arguments();
    if !raw.is_empty() {
        command.raw_arg(raw);
    }
    if suppress_output {
        command.creation_flags(CREATE_NO_WINDOW);
    }
    command
}

pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_exe_suffix_only_when_missing() {
        assert_eq!(binary_path_with_extension("C:/out/tool"), "C:/out/tool.exe");
        assert_eq!(binary_path_with_extension("C:/out/tool.exe"), "C:/out/tool.exe");
        assert_eq!(binary_path_with_extension("C:/out/TOOL.EXE"), "C:/out/TOOL.EXE");
    }
}
