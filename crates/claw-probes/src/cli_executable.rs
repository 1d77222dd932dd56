//! Executable discovery for probes that shell out.
//!
//! Probes resolve binaries against the environment's search path before
//! spawning, so a missing tool is reported as absence instead of a spawn
//! error.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(windows)]
const EXECUTABLE_SUFFIXES: &[&str] = &["", ".exe", ".cmd", ".bat"];
#[cfg(not(windows))]
const EXECUTABLE_SUFFIXES: &[&str] = &[""];

/// Resolves `executable` to a runnable file. Absolute or separator-bearing
/// names are checked directly; bare names are looked up in `search_path`.
pub fn find_executable(executable: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let trimmed = executable.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = Path::new(trimmed);
    if candidate.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        return is_executable_file(candidate).then(|| candidate.to_path_buf());
    }

    let search_path = search_path?;
    for directory in std::env::split_paths(search_path) {
        for suffix in EXECUTABLE_SUFFIXES {
            let path = directory.join(format!("{trimmed}{suffix}"));
            if is_executable_file(&path) {
                return Some(path);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn set_exec(path: &Path, mode: u32) {
        let mut perms = std::fs::metadata(path).expect("metadata").permissions();
        perms.set_mode(mode);
        std::fs::set_permissions(path, perms).expect("set perms");
    }

    #[test]
    fn unit_find_executable_rejects_empty() {
        assert!(find_executable("", None).is_none());
        assert!(find_executable("   ", None).is_none());
    }

    #[test]
    fn unit_find_executable_without_search_path_finds_nothing() {
        assert!(find_executable("node", None).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn integration_find_executable_checks_absolute_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("mock-bin");
        std::fs::write(&path, "#!/bin/sh\n").expect("write script");
        set_exec(&path, 0o755);
        assert_eq!(
            find_executable(path.to_str().unwrap_or_default(), None),
            Some(path.clone())
        );

        set_exec(&path, 0o644);
        assert!(find_executable(path.to_str().unwrap_or_default(), None).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn functional_find_executable_walks_search_path_in_order() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        let shadowed = second.path().join("mock-node");
        std::fs::write(&shadowed, "#!/bin/sh\n").expect("write script");
        set_exec(&shadowed, 0o755);
        let not_executable = first.path().join("mock-node");
        std::fs::write(&not_executable, "#!/bin/sh\n").expect("write script");
        set_exec(&not_executable, 0o644);

        let search_path =
            std::env::join_paths([first.path(), second.path()]).expect("join search path");
        assert_eq!(
            find_executable("mock-node", Some(search_path.as_os_str())),
            Some(shadowed)
        );
    }
}
