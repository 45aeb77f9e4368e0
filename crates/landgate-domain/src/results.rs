//! Test-run outcomes consumed by the failure classifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of failing tests at which a run is treated as potentially
/// truncated or otherwise untrustworthy.
pub const FAILURE_LIMIT: usize = 10;

/// Outcome of one build-and-test invocation.
///
/// Only set membership matters: test identifiers are unique, unordered, and
/// compared by exact string equality. A `BTreeSet` keeps iteration (and
/// therefore logging) deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunResult {
    failing_tests: BTreeSet<String>,
    exceeded_failure_limit: bool,
}

impl TestRunResult {
    /// Build a result from the failing test names of one run.
    ///
    /// `exceeded_failure_limit` is derived, never stored independently: it
    /// is true exactly when the failure count reaches [`FAILURE_LIMIT`].
    pub fn new<I, S>(failing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let failing_tests: BTreeSet<String> = failing.into_iter().map(Into::into).collect();
        let exceeded_failure_limit = failing_tests.len() >= FAILURE_LIMIT;
        TestRunResult {
            failing_tests,
            exceeded_failure_limit,
        }
    }

    /// An entirely green run.
    pub fn clean() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Names of the tests that failed in this run.
    pub fn failing_tests(&self) -> &BTreeSet<String> {
        &self.failing_tests
    }

    /// Whether the run hit the failure limit and may have been aborted early.
    pub fn exceeded_failure_limit(&self) -> bool {
        self.exceeded_failure_limit
    }

    /// Whether the run had no failures at all.
    pub fn is_clean(&self) -> bool {
        self.failing_tests.is_empty()
    }
}
