//! Low-level helper utilities.

pub mod relpath;
pub mod parse;
