//! Path helpers shared by the config and compose modules.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root; on a relative path with nothing left
/// to pop it is dropped.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// `path` joined onto the current directory when relative
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot read current directory");
            path.to_path_buf()
        }
    }
}

/// Resolve `path` the way the filesystem sees it, falling back to a lexical
/// normalization when it does not exist.
///
/// Relative paths are taken relative to the current directory, so `.` and
/// leading `..` keep their meaning.
pub fn resolve(path: &Path) -> PathBuf {
    let normalized = normalize_lexically(&absolutize(path));
    normalized.canonicalize().unwrap_or(normalized)
}

/// `path` relative to `base` for display, or `path` itself when outside it
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_dots() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn test_parent_of_root_is_root() {
        assert_eq!(normalize_lexically(Path::new("/../../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_relative_escape_dropped() {
        assert_eq!(normalize_lexically(Path::new("../a")), PathBuf::from("a"));
    }

    #[test]
    fn test_resolve_missing_path_is_lexical() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let missing = root.join("x").join("..").join("missing.yml");
        assert_eq!(resolve(&missing), root.join("missing.yml"));
    }

    #[test]
    fn test_resolve_relative_uses_current_dir() {
        let cwd = env::current_dir().unwrap().canonicalize().unwrap();
        assert_eq!(resolve(Path::new(".")), cwd);
        assert_ne!(resolve(Path::new(".")), PathBuf::new());
    }

    #[test]
    fn test_resolve_keeps_leading_parent() {
        let cwd = env::current_dir().unwrap();
        let expected = normalize_lexically(&cwd.join("..").join("no-such-dir-xyz"));
        assert_eq!(resolve(Path::new("../no-such-dir-xyz")), expected);
        assert!(expected.is_absolute());
    }

    #[test]
    fn test_display_relative() {
        assert_eq!(
            display_relative(Path::new("/ws/.devcontainer/devcontainer.json"), Path::new("/ws")),
            ".devcontainer/devcontainer.json"
        );
        assert_eq!(display_relative(Path::new("/other/x"), Path::new("/ws")), "/other/x");
    }
}
