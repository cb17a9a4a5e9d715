//! The verification driver.
//!
//! One verification is a strict sequence: fire the trigger, collect the
//! actual state, compare it with the expected state. A failing trigger ends
//! the sequence immediately; there is nothing meaningful to collect.

use std::fmt;
use std::path::Path;

use crate::types::{MismatchReport, TreeState, TriggerFailure, VerificationResult};

use super::collect::CollectMode;
use super::compare::compare;

/// What a trigger reports when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Whether the operation completed normally.
    pub success: bool,

    /// Process exit code, if the operation was a process.
    pub exit_code: Option<i32>,

    /// Standard output, one entry per line.
    pub stdout: Vec<String>,

    /// Standard error.
    pub stderr: String,
}

impl Completion {
    /// A successful completion with the given output lines.
    pub fn success(stdout: Vec<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout,
            stderr: String::new(),
        }
    }

    /// A failed completion.
    pub fn failure(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// Build a completion from a finished process.
    pub fn from_output(output: &std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_string)
                .collect(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    fn into_failure(self, trigger: &str) -> TriggerFailure {
        TriggerFailure {
            trigger: trigger.to_string(),
            exit_code: self.exit_code,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// The operation under test.
///
/// Implemented for any `FnMut() -> Completion`, so a closure can serve as a
/// trigger in tests.
pub trait Trigger {
    /// Name used in logs and failure messages.
    fn name(&self) -> &str {
        "operation"
    }

    /// Perform the operation and report how it finished.
    fn fire(&mut self) -> Completion;
}

impl<F> Trigger for F
where
    F: FnMut() -> Completion,
{
    fn fire(&mut self) -> Completion {
        self()
    }
}

/// Stages of one verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Setup,
    Execute,
    Collect,
    Compare,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Setup => "setup",
            Stage::Execute => "execute",
            Stage::Collect => "collect",
            Stage::Compare => "compare",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Single-use verification of one operation.
///
/// Holds one or more checks, each an expected state and where its actual
/// state comes from. `run` fires the trigger once, then collects and
/// compares every check in order; the reports are concatenated. `run`
/// consumes the verifier: there is no retry and no partial re-run.
#[derive(Debug)]
pub struct Verifier<'a> {
    checks: Vec<(&'a TreeState, CollectMode)>,
    stage: Stage,
}

impl<'a> Verifier<'a> {
    pub fn new(expected: &'a TreeState, mode: CollectMode) -> Self {
        Self {
            checks: vec![(expected, mode)],
            stage: Stage::Setup,
        }
    }

    /// Add another check against the same trigger execution.
    pub fn and_check(mut self, expected: &'a TreeState, mode: CollectMode) -> Self {
        self.checks.push((expected, mode));
        self
    }

    fn advance(&mut self, next: Stage) {
        log::debug!("verify: {} -> {}", self.stage, next);
        self.stage = next;
    }

    /// Fire `trigger`, then collect and compare each check.
    pub fn run(mut self, trigger: &mut dyn Trigger) -> VerificationResult {
        self.advance(Stage::Execute);
        let completion = trigger.fire();
        if !completion.success {
            let failure = completion.into_failure(trigger.name());
            log::debug!("verify: {failure}");
            self.advance(Stage::Done);
            return VerificationResult::Failed(failure.into());
        }

        let checks = std::mem::take(&mut self.checks);
        let mut report = MismatchReport::default();
        for (expected, mode) in checks {
            self.advance(Stage::Collect);
            let actual = match mode.collect(&completion) {
                Ok(state) => state,
                Err(e) => {
                    self.advance(Stage::Done);
                    return VerificationResult::Failed(e.into());
                }
            };

            self.advance(Stage::Compare);
            report.extend(compare(expected, &actual));
        }

        self.advance(Stage::Done);
        VerificationResult::from_report(report)
    }
}

/// Fire `trigger` and verify the result against `expected`.
pub fn verify(
    expected: &TreeState,
    trigger: &mut dyn Trigger,
    mode: CollectMode,
) -> VerificationResult {
    Verifier::new(expected, mode).run(trigger)
}

/// Verify an export-style operation in one go.
///
/// The trigger is fired once. Its output lines are checked against
/// `expected_output` (paths relative to `target`), then the tree written at
/// `target` is checked against `expected_disk`. Mismatches from both checks
/// are reported together, output records first.
pub fn verify_export(
    trigger: &mut dyn Trigger,
    target: &Path,
    expected_output: &TreeState,
    expected_disk: &TreeState,
) -> VerificationResult {
    log::debug!("verify_export: {} into {}", trigger.name(), target.display());
    Verifier::new(expected_output, CollectMode::output_under(target))
        .and_check(expected_disk, CollectMode::disk(target))
        .run(trigger)
}
