use std::time::Duration;

use async_trait::async_trait;

use super::{argv, check_bytes_eq, check_expected_error, compile_case, rjust, Expectation};
use crate::{
    config::ReverseConfig,
    oracle,
    testing::{Artifact, ArtifactSet, CaseBody, CaseContext, Failure, Suite, TestCase},
};

pub const INPUT_FILE: &str = "inputfile";
pub const OUTPUT_FILE: &str = "outputfile";
pub const MISSING_FILE: &str = "youshouldnothavethisfileinyourdirectory";
pub const USAGE: &str = "Usage: reverse -i inputfile -o outputfile\n";

/// Produces the contents of `inputfile`. Evaluated when the case runs.
pub type InputGen = fn() -> Vec<u8>;

/// Writes `inputfile`, runs the program and checks either `outputfile` against
/// the oracle or the exact error it reports.
pub struct ReverseCase {
    pub argv: Vec<String>,
    pub input: InputGen,
    pub expect: Expectation,
}

#[async_trait]
impl CaseBody for ReverseCase {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure> {
        ctx.remove_stale(OUTPUT_FILE)?;
        let input = (self.input)();
        ctx.write_fixture(INPUT_FILE, &input)?;
        ctx.register_artifact(OUTPUT_FILE);

        match &self.expect {
            Expectation::Success => {
                let expected = oracle::reverse::reverse(&input)?;
                ctx.run_checked(&self.argv).await?;
                let actual = ctx.read_file(OUTPUT_FILE)?;
                check_bytes_eq("Output", &expected, &actual)
            }
            Expectation::Error { status, stderr } => {
                let out = ctx.run(&self.argv).await?;
                check_expected_error(&out, *status, stderr)
            }
        }
    }
}

fn lines(n: usize, line: impl Fn(usize) -> String) -> Vec<u8> {
    (0..n).flat_map(|i| line(i).into_bytes()).collect()
}

fn command(exe: &str, args: &[&str]) -> Vec<String> {
    let mut res = argv(&[exe]);
    res.extend(argv(args));
    res
}

fn no_input() -> Vec<u8> {
    Vec::new()
}

pub fn suite(cfg: &ReverseConfig) -> Suite {
    let cmd = |args: &[&str]| command(&cfg.executable, args);
    let usage = || Expectation::error(1, USAGE);
    let default_argv = cmd(&["-i", INPUT_FILE, "-o", OUTPUT_FILE]);
    let ok = |name: &str, description: &str, input: InputGen| {
        TestCase::new(
            name,
            description,
            ReverseCase {
                argv: default_argv.clone(),
                input,
                expect: Expectation::Success,
            },
        )
    };
    let err = |name: &str, description: &str, argv: Vec<String>, expect: Expectation| {
        TestCase::new(
            name,
            description,
            ReverseCase {
                argv,
                input: no_input,
                expect,
            },
        )
    };

    let mut suite = Suite::new("reverse")
        .case(compile_case(&cfg.compile))
        .case(err(
            "invalid file test",
            "tests on a non-existing file",
            cmd(&["-i", MISSING_FILE, "-o", OUTPUT_FILE]),
            Expectation::error(1, format!("reverse: Cannot open file: {}\n", MISSING_FILE)),
        ))
        .case(
            err(
                "invalid argument test 1",
                "tests on too few of arguments",
                cmd(&["-i", INPUT_FILE]),
                usage(),
            )
            .point_value(5),
        )
        .case(
            err(
                "invalid argument test 2",
                "tests on too many arguments",
                cmd(&["-i", INPUT_FILE, "-o", OUTPUT_FILE, "-x", "somejunk"]),
                usage(),
            )
            .point_value(5),
        )
        .case(
            err(
                "invalid argument test 3",
                "tests on arguments with wrong flags",
                cmd(&["-x", INPUT_FILE, "-y", OUTPUT_FILE]),
                usage(),
            )
            .point_value(5),
        )
        .case(ok("example test", "comes from the project specification", || {
            b"first-1\nsecond-2\nthird-3\nfourth-4\nfifth-5\n".to_vec()
        }))
        .case(ok("empty file test", "tests on an empty file", no_input))
        .case(ok("normal test 1", "tests on 1000 short lines", || {
            lines(1000, |i| format!("{}\n", i))
        }))
        .case(ok("normal test 2", "tests on 1000 long lines", || {
            lines(1000, |i| rjust(&format!("{}\n", i), 511, '*'))
        }))
        .case(
            ok("normal test 3", "tests on 5000 varying length lines", || {
                lines(5000, |i| rjust(&format!("{}\n", i), i % 511, '*'))
            })
            .point_value(5),
        )
        .case(
            ok("normal test 4", "tests on odd number of long lines", || {
                lines(5001, |i| rjust(&format!("{}\n", i), 511, '*'))
            })
            .point_value(5),
        )
        .case(
            ok("normal test 5", "tests on 10 thousand newlines", || {
                vec![b'\n'; 10_000]
            })
            .point_value(5),
        );

    if cfg.include_stress {
        suite = suite
            .case(
                ok(
                    "stress test 1",
                    "tests on 100 thousand long lines (~50MB)",
                    || lines(100_000, |i| rjust(&format!("{}\n", i), 511, '*')),
                )
                .point_value(5)
                .timeout(Duration::from_secs(30)),
            )
            .case(
                ok(
                    "stress test 2",
                    "tests on 10 million short lines (~100MB)",
                    || lines(10_000_000, |i| format!("{}\n", i)),
                )
                .point_value(5)
                .timeout(Duration::from_secs(60)),
            );
    }

    suite.artifacts(ArtifactSet {
        per_case: vec![Artifact::file(INPUT_FILE), Artifact::file(OUTPUT_FILE)],
        per_suite: vec![
            Artifact::file(&cfg.executable),
            Artifact::file("reverse.o"),
        ],
    })
}
