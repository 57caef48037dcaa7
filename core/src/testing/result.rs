use std::{io, time::Duration};

use serde::Serialize;

use super::deadline::DeadlineExceeded;
use crate::oracle::OracleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum JudgeCode {
    /// passed
    AC,
    /// assertion failed (output mismatch)
    WA,
    /// unexpected exit status
    RE,
    /// deadline exceeded
    TLE,
    /// fixture setup/teardown or process plumbing failed
    IE,
}

#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("{0}")]
    Assertion(String),

    #[error("{} (command: {})", exit_reason(.status), .argv.join(" "))]
    ProcessFailed {
        argv: Vec<String>,
        status: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    #[error(transparent)]
    Timeout(#[from] DeadlineExceeded),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fixture(#[from] fsutil::Error),

    #[error("Cannot compute expected output: {0}")]
    Oracle(#[from] OracleError),
}

fn exit_reason(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("Non-zero exit status {}", code),
        None => "Terminated by signal".to_owned(),
    }
}

impl Failure {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn judge(&self) -> JudgeCode {
        use Failure::*;
        match self {
            Assertion(_) => JudgeCode::WA,
            ProcessFailed { .. } => JudgeCode::RE,
            Timeout(_) => JudgeCode::TLE,
            Io { .. } | Fixture(_) | Oracle(_) => JudgeCode::IE,
        }
    }
}

/// Fails the running case with `Failure::Assertion` unless `cond` holds.
#[macro_export]
macro_rules! assert_case {
    ($cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return ::std::result::Result::Err($crate::testing::Failure::Assertion(
                format!($($fmt)+),
            ));
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub judge: JudgeCode,
    pub point_value: u32,
    pub awarded: u32,
    pub reason: Option<String>,
    pub execution_time: Duration,

    /// Child that survived the kill attempt and was abandoned.
    pub leaked_pid: Option<u32>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.judge == JudgeCode::AC
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn process_failed_message_names_exit_status() {
        let f = Failure::ProcessFailed {
            argv: vec!["./reverse".into(), "-i".into(), "inputfile".into()],
            status: Some(1),
            stdout: vec![],
            stderr: b"Usage\n".to_vec(),
        };
        assert_eq!(
            f.to_string(),
            "Non-zero exit status 1 (command: ./reverse -i inputfile)"
        );
        assert_eq!(f.judge(), JudgeCode::RE);
    }

    #[test]
    fn judge_codes_follow_failure_kind() {
        let timeout = Failure::from(DeadlineExceeded {
            limit: Duration::from_secs(3),
        });
        assert_eq!(timeout.judge(), JudgeCode::TLE);
        assert_eq!(timeout.to_string(), "Timeout (exceeded 3000ms)");

        let io = Failure::io("Cannot spawn './reverse'", io::ErrorKind::NotFound.into());
        assert_eq!(io.judge(), JudgeCode::IE);

        assert_eq!(Failure::Assertion("x".into()).judge(), JudgeCode::WA);
    }

    #[test]
    fn assert_case_returns_assertion_failure() {
        fn check(x: i32) -> Result<(), Failure> {
            crate::assert_case!(x == 0, "Expected 0 but got {}", x);
            Ok(())
        }
        assert!(check(0).is_ok());
        let err = check(7).unwrap_err();
        assert_eq!(err.to_string(), "Expected 0 but got 7");
        assert_eq!(err.judge(), JudgeCode::WA);
    }
}
