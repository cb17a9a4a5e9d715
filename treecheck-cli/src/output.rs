//! Output formatting for the CLI.
//!
//! Handles human-readable and JSON output formats.

use anyhow::Result;
use serde_json::{json, Value};
use treecheck_core::{TreeState, VerificationResult};

use crate::input::TreeFormat;

/// Output handler for CLI commands.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print a collected tree. `--json` wins over `format`.
    pub fn state(&self, state: &TreeState, format: TreeFormat) -> Result<()> {
        let format = if self.json { TreeFormat::Json } else { format };
        println!("{}", format.render(state)?.trim_end());
        Ok(())
    }

    /// Print a verification verdict.
    pub fn result(&self, result: &VerificationResult) {
        if self.json {
            println!("{}", result_json(result));
            return;
        }
        match result.failure() {
            None => println!("\x1b[32mPassed\x1b[0m"),
            Some(failure) => println!("\x1b[31mFailed\x1b[0m: {failure}"),
        }
    }
}

fn result_json(result: &VerificationResult) -> Value {
    match result.failure() {
        None => json!({ "status": "passed" }),
        Some(failure) => json!({
            "status": "failed",
            "error_type": failure.error_type(),
            "message": failure.to_string(),
            "mismatches": failure.mismatches().map(|r| &r.records),
        }),
    }
}
