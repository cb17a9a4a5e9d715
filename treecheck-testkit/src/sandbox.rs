//! Sandboxed repositories seeded with the greek tree.

use fs_err as fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treecheck_core::{greek_tree, Baseline, Contents, TreeState};

use crate::config::HarnessConfig;

/// A temporary directory holding one repository and one (not yet created)
/// export target.
///
/// Layout:
///
/// ```text
/// <root>/repos/<name>   greek tree, written on build
/// <root>/store/<name>   client repository imported from repos/<name>,
///                       created only for an external client
/// <root>/wc/<name>      export target, left for the trigger to create
/// ```
///
/// The directory is removed on drop unless the config asked to keep it.
#[derive(Debug)]
pub struct Sandbox {
    /// Held only for its drop; `None` once persisted.
    _temp: Option<TempDir>,
    root: PathBuf,
    name: String,
    repo_dir: PathBuf,
    store_dir: PathBuf,
    wc_dir: PathBuf,
}

impl Sandbox {
    /// Build a sandbox with default settings.
    pub fn build(name: &str) -> Result<Self, SandboxError> {
        Self::build_with(name, &HarnessConfig::default())
    }

    /// Build a sandbox honoring `work_root` and `keep_sandboxes`.
    pub fn build_with(name: &str, config: &HarnessConfig) -> Result<Self, SandboxError> {
        let prefix = format!("treecheck-{name}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let temp = match config.work_root() {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)?
            }
            None => builder.tempdir()?,
        };

        let (temp, root) = if config.keep_sandboxes() {
            let root = temp.keep();
            (None, root)
        } else {
            let root = temp.path().to_path_buf();
            (Some(temp), root)
        };

        let repo_dir = root.join("repos").join(name);
        let store_dir = root.join("store").join(name);
        let wc_dir = root.join("wc").join(name);
        Self::materialize(greek_tree().as_state(), &repo_dir)?;
        fs::create_dir_all(root.join("wc"))?;

        log::info!("Sandbox '{}' ready at {}", name, root.display());
        Ok(Self {
            _temp: temp,
            root,
            name: name.to_string(),
            repo_dir,
            store_dir,
            wc_dir,
        })
    }

    /// Write `state` under `dir`.
    ///
    /// Entries with exact contents become files, the rest directories.
    /// Status and props are not representable on disk and are ignored.
    pub fn materialize(state: &TreeState, dir: &Path) -> Result<(), SandboxError> {
        fs::create_dir_all(dir)?;
        for (path, entry) in state.iter() {
            let target = if path.is_empty() {
                dir.to_path_buf()
            } else {
                dir.join(path)
            };
            match entry.contents() {
                Contents::Ignored => fs::create_dir_all(&target)?,
                Contents::Exact(bytes) => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&target, bytes)?;
                }
            }
        }
        log::debug!("Materialized {} entries under {}", state.len(), dir.display());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The seeded repository.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Where an external client's repository is created.
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// The export target.
    pub fn wc_dir(&self) -> &Path {
        &self.wc_dir
    }

    /// The tree the repository was seeded with.
    pub fn baseline(&self) -> &'static Baseline {
        greek_tree()
    }

    /// `file://` URL of the client repository in [`store_dir`](Self::store_dir).
    pub fn repo_url(&self) -> String {
        let path = self.store_dir.to_string_lossy().replace('\\', "/");
        if path.starts_with('/') {
            format!("file://{path}")
        } else {
            format!("file:///{path}")
        }
    }

    /// Absolute path of `rel_path` inside the repository.
    pub fn path(&self, rel_path: &str) -> PathBuf {
        self.repo_dir.join(rel_path)
    }

    /// Write a file into the repository.
    pub fn write_file(&self, rel_path: &str, contents: &[u8]) -> Result<PathBuf, SandboxError> {
        let path = self.path(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Read a file from the repository.
    pub fn read_file(&self, rel_path: &str) -> Result<Vec<u8>, SandboxError> {
        Ok(fs::read(self.path(rel_path))?)
    }

    pub fn file_exists(&self, rel_path: &str) -> bool {
        self.path(rel_path).exists()
    }

    /// Delete the export target if a previous run left one behind.
    pub fn remove_wc(&self) -> Result<(), SandboxError> {
        if self.wc_dir.exists() {
            log::debug!("Removing {}", self.wc_dir.display());
            fs::remove_dir_all(&self.wc_dir)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("sandbox I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{step} failed (exit code {exit_code:?}): {stderr}")]
    Provision {
        step: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}
