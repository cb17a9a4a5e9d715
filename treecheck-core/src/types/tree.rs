//! Tree states: ordered maps from relative path to entry descriptor.

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::entry::{Contents, Entry};
use super::error::TreeError;
use super::status::StatusCode;
use crate::helpers::relpath;

/// A declarative description of a file tree.
///
/// Keys are `/`-separated paths relative to the tree root; the root itself
/// is the empty path. Insertion order is kept for reporting but is ignored by
/// equality.
///
/// Deserializing goes through [`TreeState::add`]: two keys naming the same
/// path, such as `"A"` and `"./A/"`, are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "IndexMap<String, Entry>")]
pub struct TreeState {
    entries: IndexMap<String, Entry>,
}

impl<'de> Deserialize<'de> for TreeState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TreeStateVisitor)
    }
}

struct TreeStateVisitor;

impl<'de> Visitor<'de> for TreeStateVisitor {
    type Value = TreeState;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from relative path to entry")
    }

    fn visit_map<A>(self, mut map: A) -> Result<TreeState, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut state = TreeState::new();
        while let Some((path, entry)) = map.next_entry::<String, Entry>()? {
            state.add(&path, entry).map_err(de::Error::custom)?;
        }
        Ok(state)
    }
}

impl From<TreeState> for IndexMap<String, Entry> {
    fn from(state: TreeState) -> Self {
        state.entries
    }
}

impl TreeState {
    /// An empty tree state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from `(path, entry)` pairs. Later duplicates win;
    /// use [`add`](Self::add) when a duplicate is a mistake.
    pub fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, Entry)>,
        P: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(p, e)| (relpath::normalize(p.as_ref()), e))
                .collect(),
        }
    }

    /// Deep copy. The copy shares nothing with `self`.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.entries.get(relpath::normalize(path).as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(relpath::normalize(path).as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(p, e)| (p.as_str(), e))
    }

    /// Paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Direct read access to the underlying map.
    pub fn desc(&self) -> &IndexMap<String, Entry> {
        &self.entries
    }

    /// Direct write access to the underlying map.
    ///
    /// Keys inserted here bypass normalization and the duplicate check; they
    /// must already be in normalized form (`A/B`, not `./A/B/`).
    pub fn desc_mut(&mut self) -> &mut IndexMap<String, Entry> {
        &mut self.entries
    }

    /// Add a new entry. Fails if the path is already present.
    pub fn add(&mut self, path: &str, entry: Entry) -> Result<(), TreeError> {
        let path = relpath::normalize(path);
        if self.entries.contains_key(&path) {
            return Err(TreeError::DuplicatePath { path });
        }
        self.entries.insert(path, entry);
        Ok(())
    }

    /// Remove an entry. Fails if the path is absent.
    pub fn remove(&mut self, path: &str) -> Result<Entry, TreeError> {
        let path = relpath::normalize(path);
        self.entries
            .shift_remove(&path)
            .ok_or(TreeError::UnknownPath { path })
    }

    /// Apply `tweak` to the named paths, or to every entry if `paths` is empty.
    ///
    /// Every path is checked before anything is modified, so an unknown path
    /// leaves the state untouched.
    pub fn tweak(&mut self, paths: &[&str], tweak: &Tweak) -> Result<(), TreeError> {
        if paths.is_empty() {
            self.tweak_all(tweak);
            return Ok(());
        }

        let keys: Vec<String> = paths.iter().map(|p| relpath::normalize(p)).collect();
        if let Some(missing) = keys.iter().find(|k| !self.entries.contains_key(*k)) {
            return Err(TreeError::UnknownPath {
                path: missing.clone(),
            });
        }

        for key in keys {
            if let Some(entry) = self.entries.get_mut(&key) {
                tweak.apply_to(entry);
            }
        }
        Ok(())
    }

    /// Apply `tweak` to every entry.
    pub fn tweak_all(&mut self, tweak: &Tweak) {
        for entry in self.entries.values_mut() {
            tweak.apply_to(entry);
        }
    }

    /// The part of the tree under `prefix`, re-rooted so `prefix` becomes `""`.
    pub fn subtree(&self, prefix: &str) -> Self {
        let prefix = relpath::normalize(prefix);
        Self {
            entries: self
                .entries
                .iter()
                .filter_map(|(p, e)| relpath::strip(p, &prefix).map(|rel| (rel, e.clone())))
                .collect(),
        }
    }
}

/// A set of attribute changes applied by [`TreeState::tweak`].
///
/// Only the attributes that were set are changed; everything else on the
/// entry is left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tweak {
    contents: Option<Contents>,
    status: Option<Option<StatusCode>>,
    props: Option<Option<BTreeMap<String, String>>>,
}

impl Tweak {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set exact contents.
    pub fn contents(mut self, contents: impl Into<Contents>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    /// Stop checking contents.
    pub fn ignore_contents(mut self) -> Self {
        self.contents = Some(Contents::Ignored);
        self
    }

    /// Set the expected status code.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(Some(status));
        self
    }

    /// Stop checking status.
    pub fn clear_status(mut self) -> Self {
        self.status = Some(None);
        self
    }

    /// Replace the property map.
    pub fn props(mut self, props: BTreeMap<String, String>) -> Self {
        self.props = Some(Some(props));
        self
    }

    /// Stop checking properties.
    pub fn clear_props(mut self) -> Self {
        self.props = Some(None);
        self
    }

    /// Whether this tweak changes nothing.
    pub fn is_empty(&self) -> bool {
        self.contents.is_none() && self.status.is_none() && self.props.is_none()
    }

    /// The entry with this tweak applied.
    pub fn apply(&self, entry: &Entry) -> Entry {
        let mut entry = entry.clone();
        self.apply_to(&mut entry);
        entry
    }

    fn apply_to(&self, entry: &mut Entry) {
        if let Some(contents) = &self.contents {
            entry.set_contents(contents.clone());
        }
        if let Some(status) = self.status {
            entry.set_status(status);
        }
        if let Some(props) = &self.props {
            entry.set_props(props.clone());
        }
    }
}
