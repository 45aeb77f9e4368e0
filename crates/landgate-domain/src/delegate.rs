//! The execution delegate contract.
//!
//! The delegate owns the build working tree and every side effect: it runs
//! commands, records step outcomes, archives test artifacts, and answers the
//! policy hooks consulted at pipeline start. The landing task only observes
//! the tree through step outcomes and test results.

use crate::error::CommandError;
use crate::patch::Patch;
use crate::results::TestRunResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Correlation id handed out by [`LandingDelegate::command_failed`].
///
/// Monotonically increasing per delegate. A failed landing carries the id of
/// the specific failing invocation so a human can find it for triage; the id
/// is never used in comparison logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FailureStatusId(pub u64);

impl fmt::Display for FailureStatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build flavor for build and test commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStyle {
    Debug,
    Release,
}

impl BuildStyle {
    /// Command-line form, e.g. `--build-style=release`.
    pub fn as_flag(&self) -> &'static str {
        match self {
            BuildStyle::Debug => "--build-style=debug",
            BuildStyle::Release => "--build-style=release",
        }
    }
}

/// Handle to archived artifacts from the last test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveHandle {
    /// Unique id of the archive.
    pub id: Uuid,

    /// Archive file name as stored by the delegate.
    pub filename: String,
}

impl ArchiveHandle {
    /// Create a handle for a freshly written archive.
    pub fn new(filename: impl Into<String>) -> Self {
        ArchiveHandle {
            id: Uuid::new_v4(),
            filename: filename.into(),
        }
    }
}

/// Everything the landing task needs from the outside world.
///
/// Calls are strictly sequential: each one is awaited to completion before
/// the next step is attempted, so implementations may assume they are never
/// re-entered concurrently for one task.
#[async_trait]
pub trait LandingDelegate: Send + Sync {
    /// Execute one opaque operation; `Err` on non-zero exit.
    async fn run_command(&self, command: &[String]) -> Result<(), CommandError>;

    /// Observability hook: a step succeeded.
    async fn command_passed(&self, message: &str, patch: &Patch);

    /// Observability hook: a step failed. Returns the correlation id minted
    /// for this specific failure.
    async fn command_failed(
        &self,
        message: &str,
        error: &CommandError,
        patch: &Patch,
    ) -> FailureStatusId;

    /// Latest known state of the patch.
    async fn refetch_patch(&self, patch: &Patch) -> Patch;

    /// Results of the most recently completed test invocation.
    async fn latest_test_results(&self) -> TestRunResult;

    /// Persist artifacts from the last test run. `None` means archiving
    /// failed; the caller skips flaky-test reporting for that run, and
    /// nothing else changes.
    async fn archive_last_test_results(&self, patch: &Patch) -> Option<ArchiveHandle>;

    /// Tests identified as flaky in this run. Never counted against the patch.
    async fn report_flaky_tests(
        &self,
        patch: &Patch,
        flaky_tests: &BTreeSet<String>,
        archive: &ArchiveHandle,
    );

    /// Build flavor to use for build and test commands.
    fn build_style(&self) -> BuildStyle;

    /// Whether an earlier, lighter-weight validation pass already covered
    /// testing for this patch.
    async fn did_pass_fast_validation(&self, patch: &Patch) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_style_flags() {
        assert_eq!(BuildStyle::Release.as_flag(), "--build-style=release");
        assert_eq!(BuildStyle::Debug.as_flag(), "--build-style=debug");
    }

    #[test]
    fn test_archive_handles_are_unique() {
        let a = ArchiveHandle::new("results-1.zip");
        let b = ArchiveHandle::new("results-1.zip");
        assert_ne!(a.id, b.id);
        assert_eq!(a.filename, b.filename);
    }

    #[test]
    fn test_failure_status_id_display() {
        assert_eq!(FailureStatusId(42).to_string(), "42");
    }
}
