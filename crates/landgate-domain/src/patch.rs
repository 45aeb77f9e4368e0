//! Patch identity and review state.

use serde::{Deserialize, Serialize};

/// Review disposition recorded against the patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDisposition {
    Approved,
    Rejected,
    Pending,
}

/// A candidate change pending integration.
///
/// A `Patch` is immutable for the duration of one landing run. When reviewer
/// state may have moved (e.g. after the build/test steps), the orchestrator
/// asks the delegate for a fresh copy rather than mutating the one it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Unique id assigned by the issue tracker.
    pub id: u64,

    /// The patch has been superseded by a newer upload.
    pub obsolete: bool,

    /// Whether the parent issue is still open.
    pub issue_open: bool,

    /// Committer responsible for landing, if one is assigned.
    pub committer: Option<String>,

    /// Current review disposition.
    pub review: ReviewDisposition,
}

impl Patch {
    /// A freshly uploaded patch: open issue, no committer, review pending.
    pub fn new(id: u64) -> Self {
        Patch {
            id,
            obsolete: false,
            issue_open: true,
            committer: None,
            review: ReviewDisposition::Pending,
        }
    }

    /// Assign a committer.
    pub fn with_committer(mut self, committer: impl Into<String>) -> Self {
        self.committer = Some(committer.into());
        self
    }

    /// Set the review disposition.
    pub fn with_review(mut self, review: ReviewDisposition) -> Self {
        self.review = review;
        self
    }

    /// Mark the patch obsolete.
    pub fn obsoleted(mut self) -> Self {
        self.obsolete = true;
        self
    }

    /// Close the parent issue.
    pub fn with_issue_closed(mut self) -> Self {
        self.issue_open = false;
        self
    }
}
