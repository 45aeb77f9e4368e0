//! The landing task: a sequential state machine over the execution delegate.

use crate::classify::{self, BaselineDecision, PairDecision};
use crate::error::LandingError;
use crate::step::{FailurePolicy, Step, StepOutcome};
use crate::validate::PatchValidator;
use landgate_domain::{
    ArchiveHandle, CommandError, FailureStatusId, LandingDelegate, Patch, TestRunResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Terminal verdict of a landing run.
///
/// A confirmed patch defect is not a verdict variant: it surfaces as
/// `Err(LandingError)` from [`LandingTask::run`], carrying the failure
/// status id and, for test regressions, the offending results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Safe to land; the patch was landed.
    Pass,

    /// Inconclusive or transient trouble; re-enqueue the patch and try the
    /// whole pipeline again later.
    Defer,
}

/// Snapshot of one step failure, kept until the verdict is known.
#[derive(Debug, Clone)]
struct FailureRecord {
    step: Step,
    status_id: FailureStatusId,
    error: CommandError,
}

impl FailureRecord {
    fn into_error(self) -> LandingError {
        LandingError::StepFailed {
            step: self.step,
            status_id: self.status_id,
            source: self.error,
        }
    }
}

/// Drives one patch through the verification pipeline, start to finish.
///
/// Strictly sequential: every delegate call is awaited to completion before
/// the next step is attempted, since each test run must observe the artifact
/// state left by the previous step. One task instance handles exactly one
/// patch; the working tree itself belongs to the delegate.
pub struct LandingTask {
    delegate: Arc<dyn LandingDelegate>,
    patch: Patch,
    results_from_patch_run: Option<TestRunResult>,
    history: Vec<StepOutcome>,
}

impl LandingTask {
    /// Create a task for one patch.
    pub fn new(delegate: Arc<dyn LandingDelegate>, patch: Patch) -> Self {
        LandingTask {
            delegate,
            patch,
            results_from_patch_run: None,
            history: Vec::new(),
        }
    }

    /// The patch as currently held (refreshed from the delegate during a run).
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Step-by-step record of this run.
    pub fn history(&self) -> &[StepOutcome] {
        &self.history
    }

    /// Results of the first patched test run, if the test step ran and failed.
    pub fn results_from_patch_run(&self) -> Option<&TestRunResult> {
        self.results_from_patch_run.as_ref()
    }

    /// Execute the pipeline and return the verdict.
    ///
    /// `Ok(Verdict::Defer)` is a normal outcome, not an error; callers are
    /// expected to re-enqueue the patch. `Err` means the patch itself was
    /// confirmed defective.
    pub async fn run(&mut self) -> Result<Verdict, LandingError> {
        self.patch = self.delegate.refetch_patch(&self.patch).await;
        if !PatchValidator::validate(&self.patch) {
            info!(patch = self.patch.id, "patch is not eligible to land");
            return Ok(Verdict::Defer);
        }

        let fast_path = self.delegate.did_pass_fast_validation(&self.patch).await;

        for step in Step::PIPELINE {
            if step == Step::TestWithPatch && fast_path {
                debug!(
                    patch = self.patch.id,
                    "fast validation already covered testing; skipping test runs"
                );
                continue;
            }

            let failure = match self.run_step(step).await {
                Ok(()) => continue,
                Err(failure) => failure,
            };

            match step.on_failure() {
                FailurePolicy::Retry => return Ok(Verdict::Defer),
                FailurePolicy::Fatal => return Err(failure.into_error()),
                FailurePolicy::ConfirmViaCleanBuild => {
                    if self.run_step(Step::BuildWithoutPatch).await.is_err() {
                        // The tree is broken with or without the patch.
                        info!(patch = self.patch.id, "tree does not build; deferring");
                        return Ok(Verdict::Defer);
                    }
                    return Err(failure.into_error());
                }
                FailurePolicy::Classify => {
                    match self.classify_test_failures(failure).await? {
                        Verdict::Defer => return Ok(Verdict::Defer),
                        Verdict::Pass => {}
                    }
                }
            }
        }

        // Reviewer state may have moved while we were building and testing.
        self.patch = self.delegate.refetch_patch(&self.patch).await;
        if !PatchValidator::validate(&self.patch) {
            info!(
                patch = self.patch.id,
                "patch became ineligible before landing"
            );
            return Ok(Verdict::Defer);
        }

        if let Err(failure) = self.run_step(Step::Land).await {
            return Err(failure.into_error());
        }
        info!(patch = self.patch.id, "patch landed");
        Ok(Verdict::Pass)
    }

    /// Run one step: execute its command, report the outcome, record history.
    async fn run_step(&mut self, step: Step) -> Result<(), FailureRecord> {
        let command = step.command(&self.patch, self.delegate.build_style());
        debug!(step = %step, command = %command.join(" "), "running step");
        match self.delegate.run_command(&command).await {
            Ok(()) => {
                self.delegate
                    .command_passed(step.success_message(), &self.patch)
                    .await;
                self.history.push(StepOutcome::passed(step));
                Ok(())
            }
            Err(error) => {
                let status_id = self
                    .delegate
                    .command_failed(step.failure_message(), &error, &self.patch)
                    .await;
                info!(step = %step, %status_id, "step failed");
                self.history.push(StepOutcome::failed(step, error.clone()));
                Err(FailureRecord {
                    step,
                    status_id,
                    error,
                })
            }
        }
    }

    /// Classifier driver: up to two more test runs decide whether failures
    /// from the first patched run are flaky, pre-existing, or real.
    ///
    /// `first_failure` is the failure record of the first patched run; its
    /// status id and error are what a FAIL verdict ultimately carries.
    async fn classify_test_failures(
        &mut self,
        first_failure: FailureRecord,
    ) -> Result<Verdict, LandingError> {
        let first = self.delegate.latest_test_results().await;
        let first_archive = self.delegate.archive_last_test_results(&self.patch).await;
        self.results_from_patch_run = Some(first.clone());

        if self.run_step(Step::TestWithPatch).await.is_ok() {
            // Second patched run was green: the first run's failures did not
            // reproduce.
            if first.exceeded_failure_limit() {
                // Too many failures to trust the first run's names at all.
                return Ok(Verdict::Defer);
            }
            self.report_flaky(first.failing_tests().clone(), first_archive)
                .await;
            return Ok(Verdict::Pass);
        }

        let second = self.delegate.latest_test_results().await;
        let second_archive = self.delegate.archive_last_test_results(&self.patch).await;

        if !first.exceeded_failure_limit() && !second.exceeded_failure_limit() {
            let flaky = classify::flaky_tests(&first, &second);
            self.report_flaky(flaky, second_archive).await;
        }

        let confirmed = match classify::classify_pair(&first, &second) {
            PairDecision::Pass => return Ok(Verdict::Pass),
            PairDecision::Defer => {
                info!(patch = self.patch.id, "test signal too noisy; deferring");
                return Ok(Verdict::Defer);
            }
            PairDecision::NeedsBaseline { confirmed } => confirmed,
        };

        // Baseline on a clean tree with the patch removed. A failing command
        // here is expected whenever the tree itself is red; the results are
        // what counts.
        let baseline_outcome = self.run_step(Step::TestWithoutPatch).await;
        let baseline = self.delegate.latest_test_results().await;
        debug!(
            baseline_green = baseline_outcome.is_ok(),
            confirmed = confirmed.len(),
            "comparing reproduced failures against the clean baseline"
        );

        match classify::against_baseline(&confirmed, &baseline) {
            BaselineDecision::Defer => Ok(Verdict::Defer),
            BaselineDecision::PreExisting => {
                info!(
                    patch = self.patch.id,
                    "reproduced failures already fail without the patch"
                );
                Ok(Verdict::Pass)
            }
            BaselineDecision::Regression => Err(LandingError::TestRegression {
                status_id: first_failure.status_id,
                results: first,
                source: first_failure.error,
            }),
        }
    }

    /// Report flaky tests, unless archiving failed or there is nothing to say.
    ///
    /// A missing archive suppresses the report and nothing else; the verdict
    /// is never affected.
    async fn report_flaky(&self, flaky: BTreeSet<String>, archive: Option<ArchiveHandle>) {
        if flaky.is_empty() {
            return;
        }
        let Some(archive) = archive else {
            debug!(
                patch = self.patch.id,
                "no results archive; skipping flaky-test report"
            );
            return;
        };
        info!(
            patch = self.patch.id,
            flaky = flaky.len(),
            archive = %archive.filename,
            "reporting flaky tests"
        );
        self.delegate
            .report_flaky_tests(&self.patch, &flaky, &archive)
            .await;
    }
}
