//! Landgate domain model
//!
//! Defines the data entities and the external-delegate contract for the
//! patch-landing gatekeeper:
//! - `Patch`: a candidate change and its review state
//! - `TestRunResult`: the failing-test set of one build-and-test invocation
//! - `CommandError`: failure of one opaque delegate command
//! - `LandingDelegate`: everything the landing task needs from the outside
//!   world (command execution, observability hooks, artifact archiving,
//!   policy hooks)
//!
//! The orchestration itself lives in the `landgate` crate; this crate holds
//! only data and the boundary trait.

pub mod delegate;
pub mod error;
pub mod patch;
pub mod results;

pub use delegate::{ArchiveHandle, BuildStyle, FailureStatusId, LandingDelegate};
pub use error::CommandError;
pub use patch::{Patch, ReviewDisposition};
pub use results::{TestRunResult, FAILURE_LIMIT};

/// Landgate domain version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
