//! Per-path status codes reported by the client under test.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::TreeError;

/// Characters allowed in either status column.
pub(crate) const STATUS_ALPHABET: &[u8] = b" ADUGCRE_";

/// A two-column status code: text status followed by property status.
///
/// This is the vocabulary a client prints in front of each affected path
/// (`"A "` for an added path, `" U"` for a property-only update, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusCode([u8; 2]);

impl StatusCode {
    /// Path was added.
    pub const ADDED: Self = Self(*b"A ");
    /// Path was deleted.
    pub const DELETED: Self = Self(*b"D ");
    /// Path contents were updated.
    pub const UPDATED: Self = Self(*b"U ");
    /// Changes were merged into the path.
    pub const MERGED: Self = Self(*b"G ");
    /// Path is in conflict.
    pub const CONFLICTED: Self = Self(*b"C ");
    /// Path was replaced.
    pub const REPLACED: Self = Self(*b"R ");
    /// Path already existed and was left in place.
    pub const EXISTED: Self = Self(*b"E ");
    /// Only the path's properties were updated.
    pub const PROPS_UPDATED: Self = Self(*b" U");
    /// Path was not touched.
    pub const UNCHANGED: Self = Self(*b"  ");

    /// Parse a two-character code such as `"A "`.
    pub fn new(code: &str) -> Result<Self, TreeError> {
        match code.as_bytes() {
            [text, props] => Self::from_columns(*text, *props).ok_or_else(|| {
                TreeError::InvalidStatus {
                    code: code.to_string(),
                }
            }),
            _ => Err(TreeError::InvalidStatus {
                code: code.to_string(),
            }),
        }
    }

    /// Build a code from its two column bytes, if both are valid.
    pub fn from_columns(text: u8, props: u8) -> Option<Self> {
        if STATUS_ALPHABET.contains(&text) && STATUS_ALPHABET.contains(&props) {
            Some(Self([text, props]))
        } else {
            None
        }
    }

    /// The code as a two-character string.
    pub fn as_str(&self) -> &str {
        // Both bytes come from STATUS_ALPHABET, which is ASCII.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    /// The text-status column.
    pub fn text(&self) -> char {
        char::from(self.0[0])
    }

    /// The property-status column.
    pub fn props(&self) -> char {
        char::from(self.0[1])
    }

    /// Human-readable name of the text status.
    pub fn describe(&self) -> &'static str {
        match (self.0[0], self.0[1]) {
            (b'A', _) => "added",
            (b'D', _) => "deleted",
            (b'U', _) => "updated",
            (b'G', _) => "merged",
            (b'C', _) => "conflicted",
            (b'R', _) => "replaced",
            (b'E', _) => "existed",
            (_, b'U') => "props updated",
            (_, b'G') => "props merged",
            (_, b'C') => "props conflicted",
            _ => "unchanged",
        }
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusCode({:?})", self.as_str())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl FromStr for StatusCode {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StatusCode {
    type Error = TreeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<StatusCode> for String {
    fn from(code: StatusCode) -> Self {
        code.as_str().to_string()
    }
}
