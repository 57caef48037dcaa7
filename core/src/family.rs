//! Graded program families. Each one is a list of cases plus the artifacts
//! they leave behind; the engine in `testing` does the rest.

pub mod fsck;
pub mod reverse;
pub mod wistar;

use async_trait::async_trait;

use crate::assert_case;
use crate::config::Config;
use crate::testing::{CaseBody, CaseContext, Failure, ProcessOutput, Suite, TestCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Family {
    Reverse,
    Wistar,
    Fsck,
}

impl Family {
    pub fn suite(&self, cfg: &Config) -> anyhow::Result<Suite> {
        use Family::*;
        match self {
            Reverse => Ok(reverse::suite(&cfg.reverse)),
            Wistar => Ok(wistar::suite(&cfg.wistar)),
            Fsck => fsck::suite(&cfg.fsck),
        }
    }
}

/// How the program under test is supposed to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// exit 0 and produce the oracle's output
    Success,
    /// exit with `status`, print nothing on stdout and exactly `stderr` on stderr
    Error { status: i32, stderr: String },
}

impl Expectation {
    pub fn error(status: i32, stderr: impl Into<String>) -> Self {
        Self::Error {
            status,
            stderr: stderr.into(),
        }
    }
}

/// Compiles the program; `fallback` is tried when `argv` fails.
pub struct Compile {
    pub argv: Vec<String>,
    pub fallback: Option<Vec<String>>,
}

#[async_trait]
impl CaseBody for Compile {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure> {
        log::info!("Compiling: {}", self.argv.join(" "));
        match (ctx.run_checked(&self.argv).await, &self.fallback) {
            (Ok(_), _) => Ok(()),
            (Err(e), Some(fallback)) => {
                log::info!("{}; falling back to: {}", e, fallback.join(" "));
                ctx.run_checked(fallback).await.map(drop)
            }
            (Err(e), None) => Err(e),
        }
    }
}

pub(crate) fn compile_case(argv: &[String]) -> TestCase {
    TestCase::new(
        "compilation test",
        "compiles source code",
        Compile {
            argv: argv.to_vec(),
            fallback: None,
        },
    )
}

/// Owned command line from string slices.
pub(crate) fn argv<S: AsRef<str>>(parts: &[S]) -> Vec<String> {
    parts.iter().map(|s| s.as_ref().to_owned()).collect()
}

/// Python-style `str.rjust`: left-pads with `fill` up to `width` chars.
pub(crate) fn rjust(s: &str, width: usize, fill: char) -> String {
    let len = s.chars().count();
    let mut res: String = std::iter::repeat(fill)
        .take(width.saturating_sub(len))
        .collect();
    res.push_str(s);
    res
}

pub(crate) fn ljust(s: &str, width: usize, fill: char) -> String {
    let len = s.chars().count();
    let mut res = s.to_owned();
    res.extend(std::iter::repeat(fill).take(width.saturating_sub(len)));
    res
}

pub(crate) fn check_bytes_eq(what: &str, expected: &[u8], actual: &[u8]) -> Result<(), Failure> {
    if expected == actual {
        return Ok(());
    }
    let at = expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| expected.len().min(actual.len()));
    Err(Failure::Assertion(format!(
        "{} does not match (first difference at byte {}; expected {} bytes, got {})",
        what,
        at,
        expected.len(),
        actual.len()
    )))
}

pub(crate) fn check_expected_error(
    out: &ProcessOutput,
    status: i32,
    stderr: &str,
) -> Result<(), Failure> {
    assert_case!(!out.success(), "Expect an error from the program");
    assert_case!(
        out.status == Some(status),
        "Expect exit status {} but got {:?}",
        status,
        out.status
    );
    assert_case!(
        out.stdout.is_empty(),
        "Expect nothing to be printed in stdout"
    );
    assert_case!(
        out.stderr == stderr.as_bytes(),
        "Unexpected error message: {:?} (expected {:?})",
        String::from_utf8_lossy(&out.stderr),
        stderr
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::JudgeCode;

    #[test]
    fn rjust_and_ljust_behave_like_python() {
        assert_eq!(rjust("7\n", 5, '*'), "***7\n");
        assert_eq!(rjust("123\n", 2, '*'), "123\n");
        assert_eq!(ljust("7", 4, 'x'), "7xxx");
        assert_eq!(rjust("a.txt", 5, 'o'), "a.txt");
    }

    #[test]
    fn argv_accepts_borrowed_and_owned_parts() {
        assert_eq!(argv(&["make", "xv6_fsck"]), vec!["make", "xv6_fsck"]);
        let owned = vec!["gcc".to_owned(), "a.c".to_owned()];
        assert_eq!(argv(owned.as_slice()), owned);
        assert!(argv::<&str>(&[]).is_empty());
    }

    #[test]
    fn byte_mismatch_reports_first_difference() {
        assert!(check_bytes_eq("Output", b"abc", b"abc").is_ok());

        let err = check_bytes_eq("Output", b"abcd", b"abXd").unwrap_err();
        assert_eq!(err.judge(), JudgeCode::WA);
        assert_eq!(
            err.to_string(),
            "Output does not match (first difference at byte 2; expected 4 bytes, got 4)"
        );

        let err = check_bytes_eq("Output", b"ab\n", b"ab").unwrap_err();
        assert!(err.to_string().contains("first difference at byte 2"));
    }

    #[test]
    fn expected_error_checks() {
        let usage = "Usage: reverse -i inputfile -o outputfile\n";
        let out = |status, stdout: &str, stderr: &str| ProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        };

        assert!(check_expected_error(&out(Some(1), "", usage), 1, usage).is_ok());

        let msg = |o: ProcessOutput| check_expected_error(&o, 1, usage).unwrap_err().to_string();
        assert_eq!(msg(out(Some(0), "", "")), "Expect an error from the program");
        assert_eq!(
            msg(out(Some(2), "", usage)),
            "Expect exit status 1 but got Some(2)"
        );
        assert_eq!(
            msg(out(Some(1), "oops", usage)),
            "Expect nothing to be printed in stdout"
        );
        assert!(msg(out(Some(1), "", "usage\n")).starts_with("Unexpected error message"));
    }

    #[test]
    fn family_names_parse() {
        use std::str::FromStr;
        assert_eq!(Family::from_str("reverse").unwrap(), Family::Reverse);
        assert_eq!(Family::Fsck.to_string(), "fsck");
    }
}
