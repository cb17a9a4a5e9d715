//! treecheck core library
//!
//! Declarative tree-state model and verification engine for testing
//! operations that produce a file tree (an export, a checkout, an update).
//!
//! # Architecture
//!
//! - `types`: Core data types (Entry, TreeState, StatusCode, MismatchRecord, errors)
//! - `ops`: High-level operations (collect, compare, verify)
//! - `helpers`: Low-level utilities (relative paths, status-line parsing)
//!
//! # Example
//!
//! ```no_run
//! use treecheck_core::{greek_tree, verify, CollectMode, Completion, StatusCode, Tweak};
//!
//! let mut expected = greek_tree().copy();
//! expected.tweak_all(&Tweak::new().ignore_contents().status(StatusCode::ADDED));
//!
//! let mut trigger = || Completion::success(vec!["A    wc/iota".to_string()]);
//! let result = verify(&expected, &mut trigger, CollectMode::output_under("wc"));
//! if let Err(failure) = result.into_result() {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod types;
pub mod ops;
pub mod helpers;

// Re-export commonly used types at crate root
pub use types::{
    Baseline,
    Contents,
    Entry,
    TreeState,
    Tweak,
    StatusCode,
    MismatchKind,
    MismatchRecord,
    MismatchReport,
    TreeError,
    CollectError,
    TriggerFailure,
    VerificationFailure,
    VerificationResult,
    greek_tree,
};

// Re-export operations at crate root
pub use ops::{from_disk, from_output, CollectMode};
pub use ops::compare;
pub use ops::{verify, verify_export, Completion, Trigger, Verifier};
