use std::path::PathBuf;

use super::{cleanup::CleanupScope, CaseOutcome, Suite, SuiteReport, TestCase};

/// Sink for the records a suite run emits. Every hook defaults to doing nothing.
pub trait Reporter {
    fn suite_started(&mut self, _suite: &Suite, _total_points: u32) {}

    /// Start record of a case: name, description and point value.
    fn case_started(&mut self, _case: &TestCase) {}

    fn case_finished(&mut self, _outcome: &CaseOutcome) {}

    fn cleaned_up(&mut self, _scope: CleanupScope, _removed: &[PathBuf]) {}

    fn suite_finished(&mut self, _report: &SuiteReport) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}
