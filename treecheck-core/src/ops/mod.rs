//! High-level treecheck operations.

mod collect;
mod compare;
mod verify;

pub use collect::{from_disk, from_output, CollectMode};
pub use compare::compare;
pub use verify::{verify, verify_export, Completion, Trigger, Verifier};
