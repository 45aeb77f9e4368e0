//! Pure set logic over test-run results.
//!
//! A single failing run proves nothing. Failures must reproduce across two
//! patched runs, and reproduced failures must be absent from a clean
//! baseline, before the patch is blamed. Every decision here is a function
//! of the result sets alone; running the tests is the task's job.

use landgate_domain::TestRunResult;
use std::collections::BTreeSet;

/// Tests failing in exactly one of the two patched runs.
pub fn flaky_tests(first: &TestRunResult, second: &TestRunResult) -> BTreeSet<String> {
    first
        .failing_tests()
        .symmetric_difference(second.failing_tests())
        .cloned()
        .collect()
}

/// Tests failing in both patched runs: candidate regressions.
pub fn confirmed_failures(first: &TestRunResult, second: &TestRunResult) -> BTreeSet<String> {
    first
        .failing_tests()
        .intersection(second.failing_tests())
        .cloned()
        .collect()
}

/// Decision after the two patched runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairDecision {
    /// Nothing reproduced, the second run was entirely green, and neither
    /// run hit the failure limit: the first run's failures were flaky.
    Pass,

    /// Signal too noisy to conclude either way. No baseline is attempted;
    /// the patch goes back in the queue for a human or a later retry.
    Defer,

    /// Failures reproduced in both runs; a clean baseline must rule out
    /// pre-existing tree redness before the patch is blamed.
    NeedsBaseline {
        /// Tests failing in both patched runs.
        confirmed: BTreeSet<String>,
    },
}

/// Classify the two patched runs.
///
/// A reproducible overlap takes priority over the failure limit: once the
/// same tests fail in two independent runs, truncated results alone are not
/// a reason to defer.
pub fn classify_pair(first: &TestRunResult, second: &TestRunResult) -> PairDecision {
    let confirmed = confirmed_failures(first, second);
    if !confirmed.is_empty() {
        return PairDecision::NeedsBaseline { confirmed };
    }
    if second.is_clean() && !first.exceeded_failure_limit() && !second.exceeded_failure_limit() {
        PairDecision::Pass
    } else {
        PairDecision::Defer
    }
}

/// Decision after the baseline run on a clean tree without the patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineDecision {
    /// Every reproduced failure already fails without the patch.
    PreExisting,

    /// The baseline itself hit the failure limit and cannot be trusted.
    Defer,

    /// At least one reproduced failure is new with the patch.
    Regression,
}

/// Compare reproduced failures against the clean baseline.
pub fn against_baseline(
    confirmed: &BTreeSet<String>,
    baseline: &TestRunResult,
) -> BaselineDecision {
    if baseline.exceeded_failure_limit() {
        return BaselineDecision::Defer;
    }
    if confirmed.is_subset(baseline.failing_tests()) {
        BaselineDecision::PreExisting
    } else {
        BaselineDecision::Regression
    }
}
