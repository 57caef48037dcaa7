use std::time::Duration;

use async_trait::async_trait;

use super::{check_bytes_eq, check_expected_error, compile_case, ljust, rjust, Expectation};
use crate::{
    config::WistarConfig,
    oracle,
    testing::{Artifact, ArtifactSet, CaseBody, CaseContext, Failure, Suite, TestCase},
};

pub const ARCHIVE: &str = "test.tar";
pub const MISSING_FILE: &str = "youshouldnothavethisfileinyourdirectory";
pub const USAGE: &str = "Usage: wis-tar ARCHIVE [FILE ...]\n";

/// Input files as (name, content), in archive order.
pub type FilesGen = fn() -> Vec<(String, Vec<u8>)>;

pub struct WistarCase {
    /// Program and archive name; the generated file names are appended unless
    /// `append_files` is off.
    pub argv: Vec<String>,
    pub files: FilesGen,
    pub append_files: bool,
    /// Written to the archive path before the run.
    pub prefill: Option<&'static [u8]>,
    pub expect: Expectation,
}

#[async_trait]
impl CaseBody for WistarCase {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure> {
        ctx.remove_stale(ARCHIVE)?;
        ctx.register_artifact(ARCHIVE);
        if let Some(garbage) = self.prefill {
            ctx.write_fixture(ARCHIVE, garbage)?;
        }

        let files = (self.files)();
        let mut argv = self.argv.clone();
        for (name, content) in &files {
            ctx.write_fixture(name, content)?;
            if self.append_files {
                argv.push(name.clone());
            }
        }

        match &self.expect {
            Expectation::Success => {
                let expected = oracle::wistar::pack(&files)?;
                ctx.run_checked(&argv).await?;
                let actual = ctx.read_file(ARCHIVE)?;
                check_bytes_eq("Archive", &expected, &actual)
            }
            Expectation::Error { status, stderr } => {
                let out = ctx.run(&argv).await?;
                check_expected_error(&out, *status, stderr)
            }
        }
    }
}

fn text(name: &str, content: &str) -> (String, Vec<u8>) {
    (name.to_owned(), content.as_bytes().to_vec())
}

fn no_files() -> Vec<(String, Vec<u8>)> {
    Vec::new()
}

fn example_files() -> Vec<(String, Vec<u8>)> {
    vec![
        text("a.txt", "CS 537, Fall 2020\n"),
        text("b.txt", "Operating Systems\n"),
    ]
}

fn small_text_files(n: usize) -> Vec<(String, Vec<u8>)> {
    (0..n)
        .map(|i| text(&format!("{}.txt", i), &format!("some\ncontent\n{}", i * 537)))
        .collect()
}

fn padded(n: usize, record: impl Fn(usize) -> String) -> Vec<u8> {
    (0..n).flat_map(|i| record(i).into_bytes()).collect()
}

pub fn suite(cfg: &WistarConfig) -> Suite {
    let base = vec![cfg.executable.clone(), ARCHIVE.to_owned()];
    let case = |name: &str, description: &str, files: FilesGen| {
        TestCase::new(
            name,
            description,
            WistarCase {
                argv: base.clone(),
                files,
                append_files: true,
                prefill: None,
                expect: Expectation::Success,
            },
        )
    };

    let mut invalid_file_argv = base.clone();
    invalid_file_argv.push(MISSING_FILE.to_owned());

    let mut suite = Suite::new("wis-tar")
        .case(compile_case(&cfg.compile))
        .case(TestCase::new(
            "invalid file test",
            "tests on a non-existing file",
            WistarCase {
                argv: invalid_file_argv,
                files: no_files,
                append_files: false,
                prefill: None,
                expect: Expectation::error(
                    1,
                    format!("wis-tar: Cannot open file: {}\n", MISSING_FILE),
                ),
            },
        ))
        .case(
            TestCase::new(
                "invalid argument test",
                "tests on too few of arguments",
                WistarCase {
                    argv: base.clone(),
                    files: no_files,
                    append_files: false,
                    prefill: None,
                    expect: Expectation::error(1, USAGE),
                },
            )
            .point_value(5),
        )
        .case(case(
            "example test",
            "comes from the project specification",
            example_files,
        ))
        .case(
            TestCase::new(
                "pre-exist output test",
                "if archive already exists, overwrite it without reporting an error",
                WistarCase {
                    argv: base.clone(),
                    files: example_files,
                    append_files: true,
                    prefill: Some(b"somegarbagecontent".as_slice()),
                    expect: Expectation::Success,
                },
            )
            .point_value(5),
        )
        .case(
            case("single input test", "test on only one input", || {
                vec![text("a.txt", "CS 537, Fall 2020\n")]
            })
            .point_value(5),
        )
        .case(case("empty file test", "tests on empty files", || {
            vec![text("a.txt", ""), text("b.txt", "")]
        }))
        .case(case("normal test 1", "tests on 2 small files", || {
            small_text_files(2)
        }))
        .case(
            case("normal test 2", "tests on 11 small files", || {
                small_text_files(11)
            })
            .point_value(5),
        )
        .case(case("normal test 3", "tests on 2 small binary files", || {
            vec![
                ("a.bin".to_owned(), 123456u64.to_ne_bytes().to_vec()),
                ("b.bin".to_owned(), 789012u64.to_ne_bytes().to_vec()),
            ]
        }))
        .case(case("long filename test", "tests on 2 long-filename files", || {
            vec![
                text(&rjust("a.txt", 255, 'o'), "CS 537, Fall 2020\n"),
                text(&rjust("b.txt", 255, 'x'), "Operating Systems\n"),
            ]
        }));

    if cfg.include_stress {
        suite = suite
            .case(
                case("stress test 1", "tests on 2 large files (~50MB)", || {
                    vec![
                        (
                            "a.large".to_owned(),
                            padded(100_000, |i| rjust(&i.to_string(), 512, '*')),
                        ),
                        (
                            "b.large".to_owned(),
                            padded(100_000, |i| ljust(&i.to_string(), 512, 'x')),
                        ),
                    ]
                })
                .point_value(5)
                .timeout(Duration::from_secs(30)),
            )
            .case(
                case("stress test 2", "tests on 100 large files (~5MB)", || {
                    (0..100)
                        .map(|j| {
                            let content =
                                padded(10_000, |i| rjust(&format!("{}{}", i, j), 512, '*'));
                            (format!("{}.medium", j), content)
                        })
                        .collect()
                })
                .point_value(5)
                .timeout(Duration::from_secs(120)),
            );
    }

    suite.artifacts(ArtifactSet {
        per_case: vec![Artifact::file(ARCHIVE)],
        per_suite: vec![Artifact::file(&cfg.executable)],
    })
}
