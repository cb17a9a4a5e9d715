//! Reading expected-tree files and output lines.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use fs_err as fs;
use treecheck_core::TreeState;

/// Serialization format of a tree state file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    Json,
    Toml,
}

impl TreeFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(TreeFormat::Json),
            Some("toml") => Ok(TreeFormat::Toml),
            _ => bail!(
                "Cannot tell the format of {}: expected a .json or .toml file",
                path.display()
            ),
        }
    }

    pub fn parse(self, content: &str) -> Result<TreeState> {
        Ok(match self {
            TreeFormat::Json => serde_json::from_str(content)?,
            TreeFormat::Toml => toml::from_str(content)?,
        })
    }

    pub fn render(self, state: &TreeState) -> Result<String> {
        Ok(match self {
            TreeFormat::Json => serde_json::to_string_pretty(state)?,
            TreeFormat::Toml => toml::to_string_pretty(state)?,
        })
    }
}

/// Load an expected tree from a `.json` or `.toml` file.
pub fn load_expected(path: &Path) -> Result<TreeState> {
    let format = TreeFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let state = format
        .parse(&content)
        .with_context(|| format!("Failed to parse expected tree {}", path.display()))?;
    log::debug!("Loaded {} expected entries from {}", state.len(), path.display());
    Ok(state)
}

/// Read output lines from `input`, or from stdin when it is `None`.
pub fn read_lines(input: Option<&Path>) -> Result<Vec<String>> {
    match input {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(content.lines().map(str::to_string).collect())
        }
        None => {
            let stdin = io::stdin();
            let lines = stdin
                .lock()
                .lines()
                .collect::<io::Result<Vec<_>>>()
                .context("Failed to read output lines from stdin")?;
            Ok(lines)
        }
    }
}

/// Expand a leading `~` and make the path absolute.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    let expanded = match (path_str.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path_str == "~" => home_dir().unwrap_or_else(|| path.to_path_buf()),
        _ => path.to_path_buf(),
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Ok(cwd.join(expanded))
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
