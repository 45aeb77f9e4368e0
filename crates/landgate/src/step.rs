//! Verification steps, their commands, and their failure policy.

use chrono::{DateTime, Utc};
use landgate_domain::{BuildStyle, CommandError, Patch};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the orchestrator does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Transient infrastructure trouble; give the whole pipeline up and let
    /// the queue try again later.
    Retry,

    /// Patch-intrinsic problem; reject without any confirmation run.
    Fatal,

    /// Build once more on a clean tree without the patch before deciding
    /// whether the patch or the tree is at fault.
    ConfirmViaCleanBuild,

    /// Hand the failure to the test-result classifier.
    Classify,
}

/// One verification step of the landing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Clean,
    Update,
    ApplyPatch,
    ValidateMetadata,
    BuildWithPatch,
    BuildWithoutPatch,
    TestWithPatch,
    TestWithoutPatch,
    Land,
}

impl Step {
    /// The main pipeline, in execution order.
    ///
    /// `BuildWithoutPatch` and `TestWithoutPatch` are confirmation steps
    /// reached only from failure handling, and `Land` runs separately after
    /// the patch is re-validated.
    pub const PIPELINE: [Step; 6] = [
        Step::Clean,
        Step::Update,
        Step::ApplyPatch,
        Step::ValidateMetadata,
        Step::BuildWithPatch,
        Step::TestWithPatch,
    ];

    /// Step name as used in commands and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Clean => "clean",
            Step::Update => "update",
            Step::ApplyPatch => "apply-patch",
            Step::ValidateMetadata => "validate-metadata",
            Step::BuildWithPatch => "build-with-patch",
            Step::BuildWithoutPatch => "build-without-patch",
            Step::TestWithPatch => "test-with-patch",
            Step::TestWithoutPatch => "test-without-patch",
            Step::Land => "land",
        }
    }

    /// Failure policy applied when this step fails.
    pub fn on_failure(&self) -> FailurePolicy {
        match self {
            Step::Clean | Step::Update => FailurePolicy::Retry,
            Step::ApplyPatch | Step::ValidateMetadata | Step::Land => FailurePolicy::Fatal,
            Step::BuildWithPatch => FailurePolicy::ConfirmViaCleanBuild,
            Step::TestWithPatch => FailurePolicy::Classify,
            // Confirmation steps never consult the table themselves; their
            // outcome is interpreted by the step that triggered them.
            Step::BuildWithoutPatch | Step::TestWithoutPatch => FailurePolicy::Retry,
        }
    }

    /// Token list handed to the delegate's command runner.
    ///
    /// The tokens are a CLI surface owned by the external tooling; this core
    /// only assembles them from the step kind, the patch id, and the
    /// configured build style.
    pub fn command(&self, patch: &Patch, style: BuildStyle) -> Vec<String> {
        let tokens: Vec<String> = match self {
            Step::Clean => vec!["clean".into()],
            Step::Update => vec!["update".into()],
            Step::ApplyPatch => vec![
                "apply-patch".into(),
                "--no-update".into(),
                "--non-interactive".into(),
                patch.id.to_string(),
            ],
            Step::ValidateMetadata => vec![
                "validate-metadata".into(),
                "--non-interactive".into(),
                patch.id.to_string(),
            ],
            Step::BuildWithPatch => vec![
                "build".into(),
                "--no-clean".into(),
                "--no-update".into(),
                style.as_flag().into(),
            ],
            Step::BuildWithoutPatch => vec![
                "build".into(),
                "--force-clean".into(),
                "--no-update".into(),
                style.as_flag().into(),
            ],
            Step::TestWithPatch => vec![
                "build-and-test".into(),
                "--no-clean".into(),
                "--no-update".into(),
                "--test".into(),
                "--non-interactive".into(),
                style.as_flag().into(),
            ],
            Step::TestWithoutPatch => vec![
                "build-and-test".into(),
                "--force-clean".into(),
                "--no-update".into(),
                "--test".into(),
                "--non-interactive".into(),
                style.as_flag().into(),
            ],
            Step::Land => vec![
                "land-patch".into(),
                "--force-clean".into(),
                "--non-interactive".into(),
                patch.id.to_string(),
            ],
        };
        tokens
    }

    /// Message reported to the delegate when this step passes.
    pub fn success_message(&self) -> &'static str {
        match self {
            Step::Clean => "Cleaned working tree",
            Step::Update => "Updated working tree",
            Step::ApplyPatch => "Applied patch",
            Step::ValidateMetadata => "Metadata validated",
            Step::BuildWithPatch => "Built patch",
            Step::BuildWithoutPatch => "Able to build without patch",
            Step::TestWithPatch => "Passed tests",
            Step::TestWithoutPatch => "Able to pass tests without patch",
            Step::Land => "Landed patch",
        }
    }

    /// Message reported to the delegate when this step fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Step::Clean => "Unable to clean working tree",
            Step::Update => "Unable to update working tree",
            Step::ApplyPatch => "Patch does not apply",
            Step::ValidateMetadata => "Metadata did not pass validation",
            Step::BuildWithPatch => "Patch does not build",
            Step::BuildWithoutPatch => "Unable to build without patch",
            Step::TestWithPatch => "Patch does not pass tests",
            Step::TestWithoutPatch => "Unable to pass tests without patch",
            Step::Land => "Unable to land patch",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record of one step invocation, kept in the task's run history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Which step ran.
    pub step: Step,

    /// Whether the step's command succeeded.
    pub success: bool,

    /// The underlying command error, when the step failed.
    pub error: Option<CommandError>,

    /// When the outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl StepOutcome {
    /// Record a successful step.
    pub fn passed(step: Step) -> Self {
        StepOutcome {
            step,
            success: true,
            error: None,
            recorded_at: Utc::now(),
        }
    }

    /// Record a failed step with its command error.
    pub fn failed(step: Step, error: CommandError) -> Self {
        StepOutcome {
            step,
            success: false,
            error: Some(error),
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landgate_domain::ReviewDisposition;

    fn patch() -> Patch {
        Patch::new(10000)
            .with_committer("committer@example.com")
            .with_review(ReviewDisposition::Approved)
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = Step::PIPELINE.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "clean",
                "update",
                "apply-patch",
                "validate-metadata",
                "build-with-patch",
                "test-with-patch",
            ]
        );
    }

    #[test]
    fn test_failure_policies() {
        assert_eq!(Step::Clean.on_failure(), FailurePolicy::Retry);
        assert_eq!(Step::Update.on_failure(), FailurePolicy::Retry);
        assert_eq!(Step::ApplyPatch.on_failure(), FailurePolicy::Fatal);
        assert_eq!(Step::ValidateMetadata.on_failure(), FailurePolicy::Fatal);
        assert_eq!(Step::Land.on_failure(), FailurePolicy::Fatal);
        assert_eq!(
            Step::BuildWithPatch.on_failure(),
            FailurePolicy::ConfirmViaCleanBuild
        );
        assert_eq!(Step::TestWithPatch.on_failure(), FailurePolicy::Classify);
    }

    #[test]
    fn test_apply_command_carries_patch_id() {
        let command = Step::ApplyPatch.command(&patch(), BuildStyle::Release);
        assert_eq!(command[0], "apply-patch");
        assert!(command.contains(&"10000".to_string()));
    }

    #[test]
    fn test_patched_test_command_reuses_build_output() {
        let command = Step::TestWithPatch.command(&patch(), BuildStyle::Release);
        assert_eq!(command[0], "build-and-test");
        assert!(command.contains(&"--no-clean".to_string()));
        assert!(command.contains(&"--build-style=release".to_string()));
    }

    #[test]
    fn test_baseline_test_command_forces_clean_tree() {
        let command = Step::TestWithoutPatch.command(&patch(), BuildStyle::Debug);
        assert!(command.contains(&"--force-clean".to_string()));
        assert!(command.contains(&"--build-style=debug".to_string()));
    }

    #[test]
    fn test_step_serde_names_are_kebab_case() {
        let json = serde_json::to_string(&Step::BuildWithPatch).expect("serialize");
        assert_eq!(json, "\"build-with-patch\"");
    }
}
