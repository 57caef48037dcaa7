use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;

use super::{
    deadline::with_deadline,
    process::{ProcessOutput, Supervisor},
    reporter::Reporter,
    result::{CaseOutcome, Failure, JudgeCode},
};

/// The behavioural check of a test case. Signals failure by returning `Err`.
#[async_trait]
pub trait CaseBody: Send + Sync {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure>;
}

/// Everything one in-flight case may touch: the working dir, its single
/// supervised process and the files it asked to have cleaned up.
#[derive(Debug)]
pub struct CaseContext {
    process: Supervisor,
    kill_grace: Duration,
    registered: Vec<PathBuf>,
}

impl CaseContext {
    pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            process: Supervisor::new(workdir),
            kill_grace: Self::DEFAULT_KILL_GRACE,
            registered: Vec::new(),
        }
    }

    pub fn kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn workdir(&self) -> &Path {
        self.process.workdir()
    }

    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.workdir().join(name)
    }

    pub fn process(&mut self) -> &mut Supervisor {
        &mut self.process
    }

    pub async fn run<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<ProcessOutput, Failure> {
        self.process.run(argv).await
    }

    pub async fn run_checked<S: AsRef<str>>(
        &mut self,
        argv: &[S],
    ) -> Result<ProcessOutput, Failure> {
        self.process.run_checked(argv).await
    }

    /// Writes a generated input file and registers it for per-case cleanup.
    pub fn write_fixture(
        &mut self,
        name: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> Result<PathBuf, Failure> {
        let path = self.path(name);
        fsutil::write_with_mkdir(&path, contents)?;
        self.registered.push(path.clone());
        Ok(path)
    }

    pub fn register_artifact(&mut self, name: impl AsRef<Path>) {
        let path = self.path(name);
        self.registered.push(path);
    }

    pub fn read_file(&self, name: impl AsRef<Path>) -> Result<Vec<u8>, Failure> {
        Ok(fsutil::read(self.path(name))?)
    }

    /// Removes a leftover from an earlier run so it cannot be mistaken for fresh output.
    pub fn remove_stale(&self, name: impl AsRef<Path>) -> Result<(), Failure> {
        fsutil::remove_file_if_exists(self.path(name))?;
        Ok(())
    }

    pub fn take_registered(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.registered)
    }
}

pub struct TestCase {
    pub name: String,
    pub description: String,
    pub point_value: u32,
    pub timeout: Duration,
    body: Box<dyn CaseBody>,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("point_value", &self.point_value)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TestCase {
    pub const DEFAULT_POINT_VALUE: u32 = 10;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body: impl CaseBody + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            point_value: Self::DEFAULT_POINT_VALUE,
            timeout: Self::DEFAULT_TIMEOUT,
            body: Box::new(body),
        }
    }

    pub fn point_value(mut self, point_value: u32) -> Self {
        self.point_value = point_value;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the body once under the case's deadline and converts the result into
    /// all-or-nothing points. Failures stop here; they never reach the caller.
    pub async fn run(&self, ctx: &mut CaseContext, reporter: &mut dyn Reporter) -> CaseOutcome {
        reporter.case_started(self);

        let start_at = Instant::now();
        let res = with_deadline(self.timeout, self.body.run(ctx)).await;
        let execution_time = start_at.elapsed();

        // A child is only left behind when the body was cut short.
        let leaked_pid = match ctx.process.reclaim(ctx.kill_grace).await {
            Ok(()) => None,
            Err(e) => e.pid,
        };

        let (judge, awarded, reason) = match res {
            Ok(()) => (JudgeCode::AC, self.point_value, None),
            Err(e) => {
                log::debug!("Case '{}' failed: {:?}", self.name, e);
                (e.judge(), 0, Some(e.to_string()))
            }
        };

        let outcome = CaseOutcome {
            name: self.name.clone(),
            judge,
            point_value: self.point_value,
            awarded,
            reason,
            execution_time,
            leaked_pid,
        };
        reporter.case_finished(&outcome);
        outcome
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{reporter::NullReporter, testutil::*};

    #[derive(Default)]
    struct Recorder {
        started: Vec<(String, String, u32)>,
        finished: Vec<JudgeCode>,
    }

    impl Reporter for Recorder {
        fn case_started(&mut self, case: &TestCase) {
            self.started.push((
                case.name.clone(),
                case.description.clone(),
                case.point_value,
            ));
        }

        fn case_finished(&mut self, outcome: &CaseOutcome) {
            self.finished.push(outcome.judge);
        }
    }

    async fn run_case(case: TestCase) -> CaseOutcome {
        let mut ctx = CaseContext::new(".").kill_grace(Duration::from_secs(2));
        case.run(&mut ctx, &mut NullReporter).await
    }

    #[tokio::test]
    async fn passing_case_should_award_exact_point_value() {
        let mut rec = Recorder::default();
        let case = TestCase::new("example test", "comes from the handout", Pass).point_value(7);
        let mut ctx = CaseContext::new(".");
        let outcome = case.run(&mut ctx, &mut rec).await;

        assert_eq!(outcome.judge, JudgeCode::AC);
        assert_eq!(outcome.awarded, 7);
        assert_eq!(outcome.reason, None);
        assert_eq!(
            rec.started,
            vec![("example test".into(), "comes from the handout".into(), 7)]
        );
        assert_eq!(rec.finished, vec![JudgeCode::AC]);
    }

    #[tokio::test]
    async fn assertion_failure_should_score_zero() {
        let outcome = run_case(TestCase::new("t", "", Fail::Assertion).point_value(5)).await;
        assert_eq!(outcome.judge, JudgeCode::WA);
        assert_eq!(outcome.awarded, 0);
        assert_eq!(outcome.reason.as_deref(), Some("Output does not match"));
    }

    #[tokio::test]
    async fn unexpected_exit_status_should_score_zero() {
        let outcome = run_case(TestCase::new("t", "", Shell::checked("exit 1"))).await;
        assert_eq!(outcome.judge, JudgeCode::RE);
        assert_eq!(outcome.awarded, 0);
        assert!(outcome
            .reason
            .unwrap()
            .starts_with("Non-zero exit status 1"));
    }

    #[tokio::test]
    async fn fixture_failure_should_score_zero() {
        let outcome = run_case(TestCase::new("t", "", Fail::Fixture)).await;
        assert_eq!(outcome.judge, JudgeCode::IE);
        assert_eq!(outcome.awarded, 0);
    }

    #[tokio::test]
    async fn hanging_body_should_time_out() {
        let case = TestCase::new("t", "", Sleep(Duration::from_secs(10)))
            .timeout(Duration::from_millis(100));
        let outcome = run_case(case).await;
        assert_eq!(outcome.judge, JudgeCode::TLE);
        assert_eq!(outcome.awarded, 0);
        assert!(outcome.execution_time < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn hung_child_ignoring_sigterm_should_be_reclaimed_in_bounded_time() {
        let case = TestCase::new("t", "", Shell::unchecked("trap '' TERM; exec sleep 30"))
            .timeout(Duration::from_millis(300));
        let mut ctx = CaseContext::new(".").kill_grace(Duration::from_secs(2));

        let start_at = Instant::now();
        let outcome = case.run(&mut ctx, &mut NullReporter).await;

        assert_eq!(outcome.judge, JudgeCode::TLE);
        assert_eq!(outcome.leaked_pid, None);
        assert!(!ctx.process().has_active());
        assert!(start_at.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn written_fixtures_should_be_registered() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = CaseContext::new(dir.path());
        let path = ctx.write_fixture("inputfile", b"ab\ncd\n").unwrap();
        ctx.register_artifact("outputfile");

        assert_eq!(path, dir.path().join("inputfile"));
        assert_eq!(ctx.read_file("inputfile").unwrap(), b"ab\ncd\n");
        assert_eq!(
            ctx.take_registered(),
            vec![dir.path().join("inputfile"), dir.path().join("outputfile")]
        );
        assert!(ctx.take_registered().is_empty());
    }
}
