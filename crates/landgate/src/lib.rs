//! Landgate - automated gatekeeper for a commit queue.
//!
//! Drives a single proposed patch through a fixed verification pipeline and
//! decides whether it is safe to land:
//! - Validates patch eligibility before any work begins
//! - Applies a per-step failure policy (retry later, reject outright, or
//!   confirm against a clean tree)
//! - Runs the test suite twice with the patch applied, and once more on a
//!   clean tree when failures reproduce, so flaky tests and pre-existing
//!   breakage are never pinned on the patch

pub mod classify;
pub mod error;
pub mod step;
pub mod task;
pub mod validate;

// Re-export key types
pub use classify::{BaselineDecision, PairDecision};
pub use error::LandingError;
pub use step::{FailurePolicy, Step, StepOutcome};
pub use task::{LandingTask, Verdict};
pub use validate::PatchValidator;
