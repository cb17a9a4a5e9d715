//! Relative path utilities.
//!
//! Tree states key entries by `/`-separated strings rather than `PathBuf`
//! so that ordering is plain byte-lexicographic and identical on every
//! platform.

use std::path::{Component, Path};

/// Normalize a path string into tree-key form.
///
/// Empty and `.` segments are dropped and a leading `/` is kept.
/// `"./A//B/"` becomes `"A/B"`; `"."` and `""` become `""`. On Windows
/// backslashes are separators too; elsewhere they are part of the name, the
/// same as in the keys [`relative_to`] produces.
pub fn normalize(path: &str) -> String {
    let unified = if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.to_string()
    };
    let absolute = unified.starts_with('/');
    let joined = unified
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/");

    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Join a child name onto a normalized path.
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        normalize(name)
    } else {
        normalize(&format!("{base}/{name}"))
    }
}

/// Strip a normalized `prefix` from a normalized `path`.
///
/// Returns `Some("")` when the two are equal and `None` when `path` is not at
/// or below `prefix`. An empty prefix matches every relative path.
pub fn strip(path: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return Some(path.to_string());
    }
    if path == prefix {
        return Some(String::new());
    }
    path.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(str::to_string)
}

/// Express `path` relative to `root` in tree-key form.
///
/// Returns `None` if `path` is not under `root`.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Tree-key form of a filesystem path (used for output-mode prefixes).
pub fn from_path(path: &Path) -> String {
    normalize(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./A//B/"), "A/B");
        assert_eq!(normalize("."), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("/tmp/wc/"), "/tmp/wc");
    }

    #[cfg(windows)]
    #[test]
    fn test_normalize_backslash_separator() {
        assert_eq!(normalize("A\\B\\lambda"), "A/B/lambda");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_backslash_is_part_of_name() {
        assert_eq!(normalize("A\\B\\lambda"), "A\\B\\lambda");

        let root = PathBuf::from("/tmp/export");
        let key = relative_to(&root, &root.join("dir").join("a\\b")).unwrap();
        assert_eq!(key, "dir/a\\b");
        assert_eq!(normalize(&key), key);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "iota"), "iota");
        assert_eq!(join("A/B", "E/"), "A/B/E");
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip("wc/A/mu", "wc"), Some("A/mu".to_string()));
        assert_eq!(strip("wc", "wc"), Some(String::new()));
        assert_eq!(strip("wc2/A", "wc"), None);
        assert_eq!(strip("other", "wc"), None);
        assert_eq!(strip("A", ""), Some("A".to_string()));
    }

    #[test]
    fn test_relative_to() {
        let root = PathBuf::from("/tmp/export");
        assert_eq!(
            relative_to(&root, &root.join("A").join("mu")),
            Some("A/mu".to_string())
        );
        assert_eq!(relative_to(&root, &root), Some(String::new()));
        assert_eq!(relative_to(&root, Path::new("/elsewhere")), None);
    }
}
