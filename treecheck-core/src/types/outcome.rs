//! Verification outcome types.

use thiserror::Error;

use super::error::{CollectError, TriggerFailure};
use super::mismatch::MismatchReport;

/// Why a verification failed.
#[derive(Debug, Error)]
pub enum VerificationFailure {
    /// The operation under test did not complete normally.
    #[error(transparent)]
    Trigger(#[from] TriggerFailure),

    /// The actual state could not be collected.
    #[error(transparent)]
    Collect(#[from] CollectError),

    /// The actual tree differs from the expected tree.
    #[error("tree verification failed\n{0}")]
    Mismatch(MismatchReport),
}

impl VerificationFailure {
    /// Get the failure type as a stable string.
    pub fn error_type(&self) -> &'static str {
        match self {
            VerificationFailure::Trigger(_) => "trigger_failure",
            VerificationFailure::Collect(e) => e.error_type(),
            VerificationFailure::Mismatch(_) => "verification_mismatch",
        }
    }

    /// The mismatch report, if this is a mismatch failure.
    pub fn mismatches(&self) -> Option<&MismatchReport> {
        match self {
            VerificationFailure::Mismatch(report) => Some(report),
            _ => None,
        }
    }
}

/// Terminal result of one verification.
#[derive(Debug)]
pub enum VerificationResult {
    /// Actual state matched the expected state.
    Passed,
    /// Something went wrong; see the failure for details.
    Failed(VerificationFailure),
}

impl VerificationResult {
    /// Result of a completed comparison.
    pub fn from_report(report: MismatchReport) -> Self {
        if report.is_empty() {
            VerificationResult::Passed
        } else {
            VerificationResult::Failed(VerificationFailure::Mismatch(report))
        }
    }

    /// Check if the verification passed.
    pub fn passed(&self) -> bool {
        matches!(self, VerificationResult::Passed)
    }

    pub fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            VerificationResult::Passed => None,
            VerificationResult::Failed(f) => Some(f),
        }
    }

    /// The mismatch report, if the verification failed on a comparison.
    pub fn mismatches(&self) -> Option<&MismatchReport> {
        self.failure().and_then(VerificationFailure::mismatches)
    }

    /// Escalate to a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<(), VerificationFailure> {
        match self {
            VerificationResult::Passed => Ok(()),
            VerificationResult::Failed(f) => Err(f),
        }
    }
}
