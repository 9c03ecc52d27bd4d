use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::error::{LauncherError, Result};

/// Upper bound (exclusive) on the length of a child command line. Matches the
/// Windows `CreateProcess` limit of 32767 characters plus terminator.
pub const MAX_CMDLINE_LENGTH: usize = 32768;

/// A length-checked command line: the quoted executable followed by the
/// arguments, each passed through exactly as the caller quoted it.
///
/// Arguments stay `OsString`s so bytes that are not valid UTF-8 reach the
/// child unchanged; the textual form is only for messages.
///
/// Owned so it can be moved into the process-creation call, which on Windows
/// is allowed to rewrite its command-line buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    text: String,
    executable: String,
    arguments: Vec<OsString>,
}

impl CommandLine {
    pub fn build<S: AsRef<OsStr>>(executable: &str, arguments: &[S]) -> Result<Self> {
        let len = arguments
            .iter()
            .fold(executable.len() + 2, |len, arg| len + 1 + arg.as_ref().len());

        let mut text = String::with_capacity(len);
        text.push('"');
        text.push_str(executable);
        text.push('"');
        for arg in arguments {
            text.push(' ');
            text.push_str(&arg.as_ref().to_string_lossy());
        }

        if len >= MAX_CMDLINE_LENGTH {
            return Err(LauncherError::CommandLineTooLong {
                cmdline: text,
                len,
                max: MAX_CMDLINE_LENGTH,
            });
        }

        Ok(Self {
            text,
            executable: executable.to_string(),
            arguments: arguments.iter().map(|arg| arg.as_ref().to_os_string()).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.arguments
    }

    /// Everything after the quoted executable, without the leading space.
    pub fn raw_arguments(&self) -> OsString {
        let mut raw = OsString::new();
        for (index, arg) in self.arguments.iter().enumerate() {
            if index > 0 {
                raw.push(" ");
            }
            raw.push(arg);
        }
        raw
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
