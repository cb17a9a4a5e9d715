//! Shared, read-only baseline trees.

use std::sync::OnceLock;

use super::entry::Entry;
use super::tree::TreeState;

/// A canonical tree shared by many tests.
///
/// There are no mutators: take a [`Baseline::copy`] and change that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline(TreeState);

impl Baseline {
    pub fn new(state: TreeState) -> Self {
        Self(state)
    }

    /// A fresh, independently owned copy of the tree.
    pub fn copy(&self) -> TreeState {
        self.0.copy()
    }

    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.0.get(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.0.iter()
    }

    /// Read-only view of the underlying state.
    pub fn as_state(&self) -> &TreeState {
        &self.0
    }
}

/// The standard "greek" sample tree: 20 entries, directories without
/// contents, every file holding `This is the file '<name>'.\n`.
pub fn greek_tree() -> &'static Baseline {
    static GREEK: OnceLock<Baseline> = OnceLock::new();
    GREEK.get_or_init(|| {
        let file = |name: &str| Entry::file(format!("This is the file '{name}'.\n"));
        Baseline::new(TreeState::from_entries([
            ("iota", file("iota")),
            ("A", Entry::dir()),
            ("A/mu", file("mu")),
            ("A/B", Entry::dir()),
            ("A/B/lambda", file("lambda")),
            ("A/B/E", Entry::dir()),
            ("A/B/E/alpha", file("alpha")),
            ("A/B/E/beta", file("beta")),
            ("A/B/F", Entry::dir()),
            ("A/C", Entry::dir()),
            ("A/D", Entry::dir()),
            ("A/D/gamma", file("gamma")),
            ("A/D/G", Entry::dir()),
            ("A/D/G/pi", file("pi")),
            ("A/D/G/rho", file("rho")),
            ("A/D/G/tau", file("tau")),
            ("A/D/H", Entry::dir()),
            ("A/D/H/chi", file("chi")),
            ("A/D/H/psi", file("psi")),
            ("A/D/H/omega", file("omega")),
        ]))
    })
}
