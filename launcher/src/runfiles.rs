//! Runfiles discovery and `rlocation` lookups.

use std::path::Path;

use tracing::debug;

use crate::error::{LauncherError, Result};
use crate::host::Host;
use crate::manifest::ManifestFileMap;
use crate::platform;

pub const RUNFILES_MANIFEST_FILE: &str = "RUNFILES_MANIFEST_FILE";
pub const RUNFILES_MANIFEST_ONLY: &str = "RUNFILES_MANIFEST_ONLY";
pub const RUNFILES_DIR: &str = "RUNFILES_DIR";

enum RunfilesMode {
    ManifestBased {
        manifest_file: String,
        manifest: ManifestFileMap,
    },
    DirectoryBased,
}

/// How this launcher finds its runfiles. Decided once, at construction.
pub struct Runfiles {
    mode: RunfilesMode,
    runfiles_dir: String,
    workspace_name: String,
}

impl Runfiles {
    /// Locate the manifest (if any) and the runfiles directory for the binary
    /// started as `argv0`, parsing the manifest eagerly.
    ///
    /// A manifest that exists but has no entries selects directory mode, the
    /// same as no manifest at all.
    pub fn discover(host: &dyn Host, argv0: &str, workspace_name: &str) -> Result<Self> {
        let binary_path = platform::binary_path_with_extension(argv0);
        let runfiles_dir = host
            .var(RUNFILES_DIR)
            .unwrap_or_else(|| format!("{binary_path}.runfiles"));

        let mode = match find_manifest_file(host, &binary_path) {
            Some(manifest_file) => {
                let manifest = ManifestFileMap::parse(Path::new(&manifest_file))?;
                debug!(
                    manifest = manifest_file.as_str(),
                    entries = manifest.len(),
                    "using runfiles manifest"
                );
                if manifest.is_empty() {
                    RunfilesMode::DirectoryBased
                } else {
                    RunfilesMode::ManifestBased {
                        manifest_file,
                        manifest,
                    }
                }
            }
            None => RunfilesMode::DirectoryBased,
        };
        if matches!(mode, RunfilesMode::DirectoryBased) {
            debug!(dir = runfiles_dir.as_str(), "using runfiles directory");
        }

        Ok(Self {
            mode,
            runfiles_dir,
            workspace_name: workspace_name.to_string(),
        })
    }

    /// Build a manifest-mode instance from an already parsed table.
    pub fn from_manifest(
        manifest_file: impl Into<String>,
        manifest: ManifestFileMap,
        runfiles_dir: impl Into<String>,
        workspace_name: impl Into<String>,
    ) -> Self {
        let mode = if manifest.is_empty() {
            RunfilesMode::DirectoryBased
        } else {
            RunfilesMode::ManifestBased {
                manifest_file: manifest_file.into(),
                manifest,
            }
        };
        Self {
            mode,
            runfiles_dir: runfiles_dir.into(),
            workspace_name: workspace_name.into(),
        }
    }

    /// Build a directory-mode instance rooted at `runfiles_dir`.
    pub fn from_directory(runfiles_dir: impl Into<String>, workspace_name: impl Into<String>) -> Self {
        Self::from_manifest(String::new(), ManifestFileMap::default(), runfiles_dir, workspace_name)
    }

    /// Translate a logical runfiles path into a physical one.
    ///
    /// With `need_workspace_name` the path is taken relative to the
    /// workspace, i.e. `<workspace_name>/<path>` is looked up.
    pub fn rlocation(&self, path: &str, need_workspace_name: bool) -> Result<String> {
        match &self.mode {
            RunfilesMode::DirectoryBased => {
                if Path::new(path).is_absolute() {
                    return Ok(path.to_string());
                }
                let mut query_path = self.runfiles_dir.clone();
                if need_workspace_name {
                    query_path.push('/');
                    query_path.push_str(&self.workspace_name);
                }
                query_path.push('/');
                query_path.push_str(path);
                Ok(query_path)
            }
            RunfilesMode::ManifestBased { manifest, .. } => {
                let query_path = if need_workspace_name {
                    format!("{}/{}", self.workspace_name, path)
                } else {
                    path.to_string()
                };
                manifest
                    .get(&query_path)
                    .map(str::to_string)
                    .ok_or(LauncherError::RlocationNotFound(query_path))
            }
        }
    }

    /// Variables that tell a child launcher to reuse this lookup strategy.
    pub fn child_env(&self) -> Vec<(&'static str, String)> {
        match &self.mode {
            RunfilesMode::ManifestBased { manifest_file, .. } => vec![
                (RUNFILES_MANIFEST_ONLY, "1".to_string()),
                (RUNFILES_MANIFEST_FILE, manifest_file.clone()),
            ],
            RunfilesMode::DirectoryBased => vec![(RUNFILES_DIR, self.runfiles_dir.clone())],
        }
    }

    pub fn manifest_file(&self) -> Option<&str> {
        match &self.mode {
            RunfilesMode::ManifestBased { manifest_file, .. } => Some(manifest_file),
            RunfilesMode::DirectoryBased => None,
        }
    }

    pub fn is_manifest_based(&self) -> bool {
        self.manifest_file().is_some()
    }

    pub fn runfiles_dir(&self) -> &str {
        &self.runfiles_dir
    }

    pub fn workspace_name(&self) -> &str {
        &self.workspace_name
    }
}

/// Manifest search order:
/// 1. `$RUNFILES_MANIFEST_FILE`, when that file exists. This is how a binary
///    run as a data dependency of another one picks up the parent's runfiles.
/// 2. `$RUNFILES_DIR/MANIFEST`
/// 3. `<binary>.runfiles/MANIFEST`
/// 4. `<binary>.runfiles_manifest`
///
/// Backslashes are normalised because the path is re-exported to children,
/// some of which are shell scripts.
pub fn find_manifest_file(host: &dyn Host, binary_path: &str) -> Option<String> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(file) = host.var(RUNFILES_MANIFEST_FILE) {
        candidates.push(file);
    }
    if let Some(dir) = host.var(RUNFILES_DIR) {
        candidates.push(format!("{dir}/MANIFEST"));
    }
    let directory = format!("{binary_path}.runfiles");
    candidates.push(format!("{directory}/MANIFEST"));
    candidates.push(format!("{directory}_manifest"));

    candidates
        .into_iter()
        .find(|candidate| host.path_exists(Path::new(candidate)))
        .map(|found| found.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::FakeHost;
    use std::fs;

    fn manifest_runfiles() -> Runfiles {
        let manifest: ManifestFileMap = [
            ("pkg/data.txt", "/phys/unqualified.txt"),
            ("_main/pkg/data.txt", "/phys/qualified.txt"),
        ]
        .into_iter()
        .collect();
        Runfiles::from_manifest("/out/tool.runfiles_manifest", manifest, "/out/tool.runfiles", "_main")
    }

    #[test]
    fn directory_mode_composes_root_workspace_and_path() {
        let runfiles = Runfiles::from_directory("/out/tool.runfiles", "_main");

        assert_eq!(
            runfiles.rlocation("pkg/data.txt", false).unwrap(),
            "/out/tool.runfiles/pkg/data.txt"
        );
        assert_eq!(
            runfiles.rlocation("pkg/data.txt", true).unwrap(),
            "/out/tool.runfiles/_main/pkg/data.txt"
        );
    }

    #[test]
    fn directory_mode_passes_absolute_paths_through() {
        let runfiles = Runfiles::from_directory("/out/tool.runfiles", "_main");
        let absolute = std::env::temp_dir().join("data.txt");
        let absolute = absolute.to_str().unwrap();

        assert_eq!(runfiles.rlocation(absolute, true).unwrap(), absolute);
    }

    #[test]
    fn manifest_mode_looks_up_plain_and_qualified_keys() {
        let runfiles = manifest_runfiles();

        assert_eq!(runfiles.rlocation("pkg/data.txt", false).unwrap(), "/phys/unqualified.txt");
        assert_eq!(runfiles.rlocation("pkg/data.txt", true).unwrap(), "/phys/qualified.txt");
    }

    #[test]
    fn manifest_mode_missing_key_fails_with_the_queried_key() {
        let err = manifest_runfiles().rlocation("pkg/other.txt", true).unwrap_err();
        assert!(matches!(err, LauncherError::RlocationNotFound(ref key) if key == "_main/pkg/other.txt"));
    }

    #[test]
    fn child_env_reflects_the_mode() {
        assert_eq!(
            manifest_runfiles().child_env(),
            vec![
                (RUNFILES_MANIFEST_ONLY, "1".to_string()),
                (RUNFILES_MANIFEST_FILE, "/out/tool.runfiles_manifest".to_string()),
            ]
        );
        assert_eq!(
            Runfiles::from_directory("/out/tool.runfiles", "_main").child_env(),
            vec![(RUNFILES_DIR, "/out/tool.runfiles".to_string())]
        );
    }

    #[test]
    fn env_manifest_file_wins_when_it_exists() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit_manifest");
        fs::write(&explicit, "a b\n").unwrap();
        let runfiles_dir = dir.path().join("rf");
        fs::create_dir(&runfiles_dir).unwrap();
        fs::write(runfiles_dir.join("MANIFEST"), "c d\n").unwrap();

        let host = FakeHost::default()
            .with_var(RUNFILES_MANIFEST_FILE, explicit.to_str().unwrap())
            .with_var(RUNFILES_DIR, runfiles_dir.to_str().unwrap());
        let binary = dir.path().join("tool");

        let found = find_manifest_file(&host, binary.to_str().unwrap()).unwrap();
        assert_eq!(found, explicit.to_str().unwrap().replace('\\', "/"));
    }

    #[test]
    fn missing_env_manifest_falls_through_to_runfiles_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runfiles_dir = dir.path().join("rf");
        fs::create_dir(&runfiles_dir).unwrap();
        fs::write(runfiles_dir.join("MANIFEST"), "c d\n").unwrap();

        let host = FakeHost::default()
            .with_var(RUNFILES_MANIFEST_FILE, dir.path().join("gone").to_str().unwrap())
            .with_var(RUNFILES_DIR, runfiles_dir.to_str().unwrap());
        let binary = dir.path().join("tool");

        let found = find_manifest_file(&host, binary.to_str().unwrap()).unwrap();
        assert!(found.ends_with("rf/MANIFEST"));
    }

    #[test]
    fn binary_relative_locations_are_tried_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("tool");
        let binary = binary.to_str().unwrap();
        let host = FakeHost::default();

        assert_eq!(find_manifest_file(&host, binary), None);

        fs::write(format!("{binary}.runfiles_manifest"), "a b\n").unwrap();
        assert!(find_manifest_file(&host, binary)
            .unwrap()
            .ends_with("tool.runfiles_manifest"));

        fs::create_dir(format!("{binary}.runfiles")).unwrap();
        fs::write(format!("{binary}.runfiles/MANIFEST"), "a b\n").unwrap();
        assert!(find_manifest_file(&host, binary)
            .unwrap()
            .ends_with("tool.runfiles/MANIFEST"));
    }

    #[test]
    fn discover_without_manifest_uses_the_binary_runfiles_dir() {
        let dir = tempfile::tempdir().unwrap();
        let argv0 = dir.path().join("tool");
        let argv0 = argv0.to_str().unwrap();
        let binary = platform::binary_path_with_extension(argv0);

        let runfiles = Runfiles::discover(&FakeHost::default(), argv0, "_main").unwrap();

        assert!(!runfiles.is_manifest_based());
        assert_eq!(runfiles.runfiles_dir(), format!("{binary}.runfiles"));
        assert_eq!(
            runfiles.rlocation("bin/app", true).unwrap(),
            format!("{binary}.runfiles/_main/bin/app")
        );
    }

    #[test]
    fn discover_prefers_runfiles_dir_variable_for_directory_mode() {
        let dir = tempfile::tempdir().unwrap();
        let argv0 = dir.path().join("tool");
        let host = FakeHost::default().with_var(RUNFILES_DIR, "/remote/rf");

        let runfiles = Runfiles::discover(&host, argv0.to_str().unwrap(), "_main").unwrap();

        assert_eq!(runfiles.runfiles_dir(), "/remote/rf");
        assert_eq!(runfiles.rlocation("a/b", false).unwrap(), "/remote/rf/a/b");
    }

    #[test]
    fn discover_parses_the_manifest_next_to_the_binary() {
        let dir = tempfile::tempdir().unwrap();
        let argv0 = dir.path().join("tool");
        let argv0 = argv0.to_str().unwrap();
        let binary = platform::binary_path_with_extension(argv0);
        fs::write(
            format!("{binary}.runfiles_manifest"),
            "_main/bin/app /abs/bin/app\n",
        )
        .unwrap();

        let runfiles = Runfiles::discover(&FakeHost::default(), argv0, "_main").unwrap();

        assert!(runfiles.is_manifest_based());
        assert_eq!(runfiles.rlocation("bin/app", true).unwrap(), "/abs/bin/app");
    }

    #[test]
    fn discover_propagates_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let argv0 = dir.path().join("tool");
        let argv0 = argv0.to_str().unwrap();
        let binary = platform::binary_path_with_extension(argv0);
        fs::write(format!("{binary}.runfiles_manifest"), "no-separator\n").unwrap();

        assert!(matches!(
            Runfiles::discover(&FakeHost::default(), argv0, "_main"),
            Err(LauncherError::ManifestLine { .. })
        ));
    }

    #[test]
    fn empty_manifest_selects_directory_mode() {
        let dir = tempfile::tempdir().unwrap();
        let argv0 = dir.path().join("tool");
        let argv0 = argv0.to_str().unwrap();
        let binary = platform::binary_path_with_extension(argv0);
        fs::write(format!("{binary}.runfiles_manifest"), "").unwrap();

        let runfiles = Runfiles::discover(&FakeHost::default(), argv0, "_main").unwrap();

        assert!(!runfiles.is_manifest_based());
        assert_eq!(runfiles.child_env()[0].0, RUNFILES_DIR);
    }
}
