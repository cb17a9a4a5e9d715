//! Core type definitions for treecheck.

mod status;
mod entry;
mod tree;
mod baseline;
mod mismatch;
mod outcome;
mod error;

pub use status::StatusCode;
pub use entry::{Contents, Entry};
pub use tree::{TreeState, Tweak};
pub use baseline::{greek_tree, Baseline};
pub use mismatch::{MismatchKind, MismatchRecord, MismatchReport};
pub use outcome::{VerificationFailure, VerificationResult};
pub use error::{CollectError, TreeError, TriggerFailure};
