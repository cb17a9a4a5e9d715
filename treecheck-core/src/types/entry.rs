//! Entry descriptors: the expected (or observed) properties of one path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::status::StatusCode;

/// Contents of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<ContentsRepr>", into = "Option<ContentsRepr>")]
pub enum Contents {
    /// Directory, or a file whose contents are not checked.
    #[default]
    Ignored,
    /// Exact bytes, compared without any normalization.
    Exact(Vec<u8>),
}

/// On-disk form of [`Contents`] in expected-tree files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentsRepr {
    /// UTF-8 text.
    Text(String),
    /// Arbitrary bytes, as an array of integers.
    Binary(Vec<u8>),
}

impl From<Option<ContentsRepr>> for Contents {
    fn from(repr: Option<ContentsRepr>) -> Self {
        match repr {
            None => Contents::Ignored,
            Some(ContentsRepr::Text(s)) => Contents::Exact(s.into_bytes()),
            Some(ContentsRepr::Binary(b)) => Contents::Exact(b),
        }
    }
}

impl From<Contents> for Option<ContentsRepr> {
    fn from(contents: Contents) -> Self {
        match contents {
            Contents::Ignored => None,
            Contents::Exact(bytes) => Some(match String::from_utf8(bytes) {
                Ok(s) => ContentsRepr::Text(s),
                Err(e) => ContentsRepr::Binary(e.into_bytes()),
            }),
        }
    }
}

impl Contents {
    /// Whether these contents are exempt from comparison.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Contents::Ignored)
    }

    /// The exact bytes, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Contents::Ignored => None,
            Contents::Exact(b) => Some(b),
        }
    }
}

impl From<&str> for Contents {
    fn from(s: &str) -> Self {
        Contents::Exact(s.as_bytes().to_vec())
    }
}

impl From<String> for Contents {
    fn from(s: String) -> Self {
        Contents::Exact(s.into_bytes())
    }
}

impl From<Vec<u8>> for Contents {
    fn from(b: Vec<u8>) -> Self {
        Contents::Exact(b)
    }
}

impl From<&[u8]> for Contents {
    fn from(b: &[u8]) -> Self {
        Contents::Exact(b.to_vec())
    }
}

/// Longest content preview shown in reports.
pub(crate) const PREVIEW_BYTES: usize = 120;

impl fmt::Display for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Ignored => write!(f, "<not checked>"),
            Contents::Exact(bytes) if bytes.len() > PREVIEW_BYTES => {
                let head = String::from_utf8_lossy(&bytes[..PREVIEW_BYTES]);
                write!(f, "{:?}... ({} bytes)", head, bytes.len())
            }
            Contents::Exact(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// Expected or observed properties of one tree entry.
///
/// The default value means "present, unchanged, contents not checked", which
/// is what directories and untouched files need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Contents::is_ignored")]
    contents: Contents,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<StatusCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    props: Option<BTreeMap<String, String>>,
}

impl Entry {
    /// An entry with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A file entry with exact contents.
    pub fn file(contents: impl Into<Contents>) -> Self {
        Self {
            contents: contents.into(),
            ..Self::default()
        }
    }

    /// A directory entry (contents ignored).
    pub fn dir() -> Self {
        Self::default()
    }

    /// Replace the contents.
    pub fn with_contents(mut self, contents: impl Into<Contents>) -> Self {
        self.contents = contents.into();
        self
    }

    /// Exempt the contents from comparison.
    pub fn with_ignored_contents(mut self) -> Self {
        self.contents = Contents::Ignored;
        self
    }

    /// Set the expected status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Set one property, enabling property checks for this entry.
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace the whole property map.
    pub fn with_props(mut self, props: BTreeMap<String, String>) -> Self {
        self.props = Some(props);
        self
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn props(&self) -> Option<&BTreeMap<String, String>> {
        self.props.as_ref()
    }

    pub(crate) fn set_contents(&mut self, contents: Contents) {
        self.contents = contents;
    }

    pub(crate) fn set_status(&mut self, status: Option<StatusCode>) {
        self.status = status;
    }

    pub(crate) fn set_props(&mut self, props: Option<BTreeMap<String, String>>) {
        self.props = props;
    }
}
