//! Actual-state collection.
//!
//! Two modes produce the same [`TreeState`] schema:
//!
//! - **Filesystem**: walk a directory; files carry their literal bytes,
//!   directories are content-ignored, status is always unchanged.
//! - **Output**: parse the per-path status lines printed by the operation;
//!   every entry carries the reported status with contents ignored.

use fs_err as fs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::helpers::parse::parse_status_line;
use crate::helpers::relpath;
use crate::types::{CollectError, Entry, StatusCode, TreeState};

use super::verify::Completion;

/// Where the actual state of a verification comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectMode {
    /// Walk the directory at `root`.
    Disk { root: PathBuf },
    /// Parse the trigger's output lines, stripping `strip_prefix` from paths.
    Output { strip_prefix: Option<String> },
}

impl CollectMode {
    pub fn disk(root: impl Into<PathBuf>) -> Self {
        CollectMode::Disk { root: root.into() }
    }

    /// Output mode with paths kept as printed.
    pub fn output() -> Self {
        CollectMode::Output { strip_prefix: None }
    }

    /// Output mode with paths made relative to `prefix`.
    pub fn output_under(prefix: impl AsRef<Path>) -> Self {
        CollectMode::Output {
            strip_prefix: Some(relpath::from_path(prefix.as_ref())),
        }
    }

    /// Build the actual state for a finished trigger.
    pub fn collect(&self, completion: &Completion) -> Result<TreeState, CollectError> {
        match self {
            CollectMode::Disk { root } => from_disk(root),
            CollectMode::Output { strip_prefix } => {
                Ok(from_output(&completion.stdout, strip_prefix.as_deref()))
            }
        }
    }
}

/// Snapshot the directory tree under `root`.
///
/// The root itself is the entry `""`. Every entry is recorded as unchanged;
/// an exported tree has no history. A missing `root` yields an empty state,
/// so every expected path shows up as missing rather than as an I/O error.
pub fn from_disk(root: &Path) -> Result<TreeState, CollectError> {
    if fs::symlink_metadata(root).is_err() {
        log::debug!("collect: {} does not exist, empty snapshot", root.display());
        return Ok(TreeState::new());
    }

    let mut state = TreeState::new();
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

    for item in walker {
        let item = item.map_err(|source| CollectError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let Some(rel) = relpath::relative_to(root, item.path()) else {
            continue;
        };

        let file_type = item.file_type();
        let entry = if file_type.is_dir() {
            Entry::dir()
        } else if file_type.is_symlink() {
            let target = fs::read_link(item.path()).map_err(|source| CollectError::Read {
                path: item.path().to_path_buf(),
                source,
            })?;
            Entry::file(target.to_string_lossy().into_owned())
        } else {
            let bytes = fs::read(item.path()).map_err(|source| CollectError::Read {
                path: item.path().to_path_buf(),
                source,
            })?;
            let entry = Entry::file(bytes);
            match file_props(item.path())? {
                Some(props) => entry.with_props(props),
                None => entry,
            }
        };

        state
            .desc_mut()
            .insert(rel, entry.with_status(StatusCode::UNCHANGED));
    }

    log::debug!(
        "collect: {} entries under {}",
        state.len(),
        root.display()
    );
    Ok(state)
}

/// Properties observable on disk, `None` when the file has none.
#[cfg(unix)]
fn file_props(path: &Path) -> Result<Option<BTreeMap<String, String>>, CollectError> {
    use std::os::unix::fs::PermissionsExt;

    let meta = fs::metadata(path).map_err(|source| CollectError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if meta.permissions().mode() & 0o111 == 0 {
        return Ok(None);
    }
    let mut props = BTreeMap::new();
    props.insert("executable".to_string(), "*".to_string());
    Ok(Some(props))
}

#[cfg(not(unix))]
fn file_props(_path: &Path) -> Result<Option<BTreeMap<String, String>>, CollectError> {
    Ok(None)
}

/// Build a state from the status lines in `lines`.
///
/// Lines that are not status lines are skipped. When a path is reported more
/// than once the last status wins.
pub fn from_output<I, S>(lines: I, strip_prefix: Option<&str>) -> TreeState
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = strip_prefix.map(relpath::normalize);
    let mut state = TreeState::new();
    let mut skipped = 0usize;

    for line in lines {
        let Some(parsed) = parse_status_line(line.as_ref()) else {
            skipped += 1;
            continue;
        };

        let path = relpath::normalize(parsed.path);
        let key = match &prefix {
            Some(p) => relpath::strip(&path, p).unwrap_or(path),
            None => path,
        };
        state
            .desc_mut()
            .insert(key, Entry::new().with_status(parsed.status));
    }

    log::debug!(
        "collect: {} entries from output ({} non-status lines skipped)",
        state.len(),
        skipped
    );
    state
}
