use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::{
    cleanup::{self, Artifact, ArtifactSet, CleanupScope},
    reporter::Reporter,
    result::CaseOutcome,
    testcase::{CaseContext, TestCase},
};

#[derive(Debug)]
pub struct Suite {
    pub name: String,
    pub cases: Vec<TestCase>,
    pub artifacts: ArtifactSet,
}

#[derive(Debug, Clone)]
pub struct SuiteOptions {
    pub workdir: PathBuf,
    pub short_circuit: bool,
    pub cleanup: bool,
    pub kill_grace: Duration,

    /// Removed together with the suite's own per-suite artifacts.
    pub extra_artifacts: Vec<Artifact>,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            short_circuit: true,
            cleanup: false,
            kill_grace: CaseContext::DEFAULT_KILL_GRACE,
            extra_artifacts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub succeeded: usize,
    pub failed: usize,
    pub not_run: usize,
    pub points: u32,
    pub total_points: u32,
    pub outcomes: Vec<CaseOutcome>,
    pub not_run_cases: Vec<String>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.not_run == 0
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SuiteError {
    #[error("Total point value of suite '{0}' overflows")]
    PointOverflow(String),
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
            artifacts: ArtifactSet::default(),
        }
    }

    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn artifacts(mut self, artifacts: ArtifactSet) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn total_points(&self) -> Option<u32> {
        self.cases
            .iter()
            .try_fold(0u32, |acc, case| acc.checked_add(case.point_value))
    }

    /// Runs the cases strictly in order.
    ///
    /// A failed case only stops the run when `short_circuit` is set; the cases
    /// after it are reported as not-run. With `cleanup` set, per-case artifacts
    /// (including files a case registered) are removed before the next case
    /// starts, and per-suite artifacts once at the very end.
    pub async fn run(
        &self,
        opts: &SuiteOptions,
        reporter: &mut dyn Reporter,
    ) -> Result<SuiteReport, SuiteError> {
        let overflow = || SuiteError::PointOverflow(self.name.clone());
        let total_points = self.total_points().ok_or_else(overflow)?;

        let started_at = Local::now();
        reporter.suite_started(self, total_points);

        let mut outcomes = Vec::with_capacity(self.cases.len());
        let mut not_run_cases = Vec::new();
        let (mut succeeded, mut failed, mut points) = (0, 0, 0u32);

        for (i, case) in self.cases.iter().enumerate() {
            let mut ctx = CaseContext::new(&opts.workdir).kill_grace(opts.kill_grace);
            let outcome = case.run(&mut ctx, reporter).await;

            if opts.cleanup {
                let registered: Vec<_> = ctx
                    .take_registered()
                    .into_iter()
                    .map(Artifact::File)
                    .collect();
                let removed = cleanup::remove_artifacts(
                    &opts.workdir,
                    self.artifacts.per_case.iter().chain(&registered),
                );
                reporter.cleaned_up(CleanupScope::Case, &removed);
            }

            let passed = outcome.passed();
            if passed {
                succeeded += 1;
                points = points.checked_add(outcome.awarded).ok_or_else(overflow)?;
            } else {
                failed += 1;
            }
            outcomes.push(outcome);

            if !passed && opts.short_circuit {
                not_run_cases = self.cases[i + 1..]
                    .iter()
                    .map(|c| c.name.clone())
                    .collect();
                break;
            }
        }

        if opts.cleanup {
            let removed = cleanup::remove_artifacts(
                &opts.workdir,
                self.artifacts.per_suite.iter().chain(&opts.extra_artifacts),
            );
            reporter.cleaned_up(CleanupScope::Suite, &removed);
        }

        let report = SuiteReport {
            suite: self.name.clone(),
            started_at,
            finished_at: Local::now(),
            succeeded,
            failed,
            not_run: not_run_cases.len(),
            points,
            total_points,
            outcomes,
            not_run_cases,
        };
        reporter.suite_finished(&report);
        Ok(report)
    }
}
