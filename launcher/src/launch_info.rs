//! Build-time launch data embedded in the launcher executable.
//!
//! The build appends a block of NUL-separated `key=value` entries to the end
//! of the launcher binary, followed by the block's byte length as a
//! little-endian `i64`. Executable loaders ignore trailing bytes, so the
//! launcher can read its own configuration back at startup.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{LauncherError, Result};

/// Workspace that owns the target, prefixed onto qualified runfile lookups.
pub const WORKSPACE_NAME: &str = "workspace_name";
/// Logical runfiles path of the program to launch.
pub const BINARY_PATH: &str = "binary_path";
/// `0` when `binary_path` is already a full runfiles path.
pub const BINARY_PATH_QUALIFIED: &str = "binary_path_qualified";
/// `1` to launch the target without visible output.
pub const SUPPRESS_OUTPUT: &str = "suppress_output";

const SIZE_TRAILER_LEN: u64 = std::mem::size_of::<i64>() as u64;

/// Immutable key/value settings injected by the build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LaunchInfo {
    entries: HashMap<String, String>,
}

impl LaunchInfo {
    /// Build launch info from already-parsed pairs, rejecting duplicate keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = HashMap::new();
        for (key, value) in pairs {
            match entries.entry(key.into()) {
                Entry::Vacant(slot) => {
                    slot.insert(value.into());
                }
                Entry::Occupied(slot) => {
                    return Err(LauncherError::LaunchInfoDuplicateKey(slot.key().clone()));
                }
            }
        }
        Ok(Self { entries })
    }

    /// Parse a launch data block (without the size trailer).
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|err| LauncherError::LaunchDataCorrupt(format!("not UTF-8: {err}")))?;

        let mut pairs = Vec::new();
        for entry in text.split('\0').filter(|entry| !entry.is_empty()) {
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                LauncherError::LaunchDataCorrupt(format!("entry without '=': {entry}"))
            })?;
            if key.is_empty() {
                return Err(LauncherError::LaunchDataCorrupt(format!(
                    "entry with empty key: {entry}"
                )));
            }
            pairs.push((key, value));
        }
        Self::from_pairs(pairs)
    }

    /// Read the launch data appended to the executable at `path`.
    pub fn from_executable(path: &Path) -> Result<Self> {
        let io_err = |source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let file_len = file.metadata().map_err(io_err)?.len();
        if file_len < SIZE_TRAILER_LEN {
            return Err(LauncherError::LaunchDataCorrupt(format!(
                "{} is too small to carry launch data",
                path.display()
            )));
        }

        let mut trailer = [0u8; SIZE_TRAILER_LEN as usize];
        file.seek(SeekFrom::End(-(SIZE_TRAILER_LEN as i64)))
            .map_err(io_err)?;
        file.read_exact(&mut trailer).map_err(io_err)?;

        let data_len = i64::from_le_bytes(trailer);
        let available = file_len - SIZE_TRAILER_LEN;
        let data_len = u64::try_from(data_len)
            .ok()
            .filter(|len| *len <= available)
            .ok_or_else(|| {
                LauncherError::LaunchDataCorrupt(format!(
                    "declared size {data_len} does not fit in {}",
                    path.display()
                ))
            })?;

        let mut data = vec![0u8; data_len as usize];
        file.seek(SeekFrom::Start(available - data_len))
            .map_err(io_err)?;
        file.read_exact(&mut data).map_err(io_err)?;

        Self::parse(&data)
    }

    /// Look up a required key.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.get_optional(key)
            .ok_or_else(|| LauncherError::LaunchInfoKeyMissing(key.to_string()))
    }

    pub fn get_optional(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serialize `pairs` into the block format read by [`LaunchInfo::from_executable`],
/// size trailer included.
pub fn encode_launch_data<'a, I>(pairs: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut data = Vec::new();
    for (key, value) in pairs {
        data.extend_from_slice(key.as_bytes());
        data.push(b'=');
        data.extend_from_slice(value.as_bytes());
        data.push(0);
    }
    let len = data.len() as i64;
    data.extend_from_slice(&len.to_le_bytes());
    data
}
