//! Landing failure taxonomy.

use crate::step::Step;
use landgate_domain::{CommandError, FailureStatusId, TestRunResult};
use thiserror::Error;

/// A confirmed patch defect.
///
/// Deferrals are not errors; they come back as `Verdict::Defer`. Every
/// variant carries the delegate-issued correlation id of the failing
/// invocation so the failure can be inspected without re-running anything.
#[derive(Debug, Clone, Error)]
pub enum LandingError {
    /// A fatal step failed, or the patched build broke while a clean build
    /// succeeded.
    #[error("step `{step}` failed (status {status_id}): {source}")]
    StepFailed {
        step: Step,
        status_id: FailureStatusId,
        source: CommandError,
    },

    /// Failures reproduced across both patched runs and did not all
    /// reproduce on the clean baseline.
    #[error("patch introduces failing tests (status {status_id}): {source}")]
    TestRegression {
        status_id: FailureStatusId,
        results: TestRunResult,
        source: CommandError,
    },
}

impl LandingError {
    /// Correlation id reported by the delegate for the failing invocation.
    pub fn failure_status_id(&self) -> FailureStatusId {
        match self {
            LandingError::StepFailed { status_id, .. } => *status_id,
            LandingError::TestRegression { status_id, .. } => *status_id,
        }
    }

    /// Results of the first patched test run, when the failure was a test
    /// regression.
    pub fn test_results(&self) -> Option<&TestRunResult> {
        match self {
            LandingError::StepFailed { .. } => None,
            LandingError::TestRegression { results, .. } => Some(results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_carries_status_id() {
        let error = LandingError::StepFailed {
            step: Step::ApplyPatch,
            status_id: FailureStatusId(3),
            source: CommandError::new(&["apply-patch".to_string()], 1, "hunk mismatch"),
        };
        assert_eq!(error.failure_status_id(), FailureStatusId(3));
        assert!(error.test_results().is_none());
        assert!(error.to_string().contains("apply-patch"));
    }

    #[test]
    fn test_regression_exposes_offending_results() {
        let error = LandingError::TestRegression {
            status_id: FailureStatusId(1),
            results: TestRunResult::new(vec!["Fail1"]),
            source: CommandError::new(&["build-and-test".to_string()], 1, "1 test failed"),
        };
        let results = error.test_results().expect("results attached");
        assert!(results.failing_tests().contains("Fail1"));
    }
}
