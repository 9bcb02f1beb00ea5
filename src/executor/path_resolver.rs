use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct PathResolver;

impl PathResolver {
    /// Looks `command` up in the directories of `path_var`. Names with a
    /// `/` are taken as they are and left for `execve` to judge.
    pub fn resolve(&self, command: &str, path_var: Option<&str>) -> Option<PathBuf> {
        if command.is_empty() {
            return None;
        }
        if command.contains('/') {
            return Some(PathBuf::from(command));
        }

        let paths = path_var?;
        for dir in std::env::split_paths(paths) {
            let full_path = dir.join(command);
            if is_executable(&full_path) {
                return Some(full_path);
            }
        }

        None
    }
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
