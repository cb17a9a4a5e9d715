//! treecheck error types.
//!
//! Tree-authoring errors carry a stable `error_type()` string so that
//! callers (and the CLI's JSON output) can match on them without parsing
//! messages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from building or mutating a [`TreeState`](crate::TreeState).
///
/// These are always test-authoring defects and are never recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A tweak or remove named a path that is not in the state.
    #[error("unknown path in tree state: '{path}'")]
    UnknownPath { path: String },

    /// An add named a path that is already in the state.
    #[error("path already in tree state: '{path}' (use tweak to modify it)")]
    DuplicatePath { path: String },

    /// A status code was not two characters from the status alphabet.
    #[error("invalid status code {code:?}")]
    InvalidStatus { code: String },
}

impl TreeError {
    /// Get the error type as a stable string.
    pub fn error_type(&self) -> &'static str {
        match self {
            TreeError::UnknownPath { .. } => "unknown_path",
            TreeError::DuplicatePath { .. } => "duplicate_path",
            TreeError::InvalidStatus { .. } => "invalid_status",
        }
    }
}

/// Errors while building an actual tree state.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Directory traversal failed.
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Reading a file (or a link target) failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CollectError {
    pub fn error_type(&self) -> &'static str {
        match self {
            CollectError::Walk { .. } => "walk_error",
            CollectError::Read { .. } => "read_error",
        }
    }
}

/// The operation under test reported abnormal completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{trigger} failed{}{}", exit_suffix(.exit_code), stderr_suffix(.stderr))]
pub struct TriggerFailure {
    /// Name of the trigger that failed.
    pub trigger: String,

    /// Exit code, when the trigger was a process that exited normally.
    pub exit_code: Option<i32>,

    /// Captured standard output lines.
    pub stdout: Vec<String>,

    /// Captured standard error.
    pub stderr: String,
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" with exit code {c}")).unwrap_or_default()
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
