use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::error::{LauncherError, Result};

/// Runfiles manifest: logical runfile path -> physical path.
///
/// Each manifest line is `<key> <value>`, split at the first space, so values
/// may contain spaces and keys may not. An empty map means no manifest was
/// found and runfiles are looked up relative to a directory instead.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManifestFileMap {
    entries: HashMap<String, String>,
}

impl ManifestFileMap {
    /// Parse the manifest at `path`.
    ///
    /// The map is only returned once every line has been accepted, so a
    /// malformed manifest never yields a partial table. A line that is not
    /// UTF-8 counts as malformed. When a key repeats, the first occurrence is
    /// kept.
    pub fn parse(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| LauncherError::ManifestOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let mut entries = HashMap::new();
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line.map_err(|source| LauncherError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let line = line.strip_suffix(b"\r").unwrap_or(&line);
            let malformed = || LauncherError::ManifestLine {
                line_number: index + 1,
                line: String::from_utf8_lossy(line).into_owned(),
            };
            let text = std::str::from_utf8(line).map_err(|_| malformed())?;
            let (key, value) = split_line(text).ok_or_else(malformed)?;

            match entries.entry(key.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(value.to_string());
                }
                Entry::Occupied(existing) => {
                    warn!(
                        key = existing.key().as_str(),
                        kept = existing.get().as_str(),
                        ignored = value,
                        "duplicate runfiles manifest entry"
                    );
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ManifestFileMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = HashMap::new();
        for (key, value) in iter {
            entries.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { entries }
    }
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    match line.split_once(' ') {
        Some((key, value)) if !key.is_empty() => Some((key, value)),
        _ => None,
    }
}
