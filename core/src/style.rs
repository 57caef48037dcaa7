use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::testing::{CaseOutcome, CleanupScope, JudgeCode, Reporter};
use crate::testing::{Suite, SuiteReport, TestCase};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for JudgeCode {
    fn color(&self) -> Color {
        use JudgeCode::*;
        if !self::is_truecolor_supported() {
            return match self {
                AC => Color::Green,
                WA => Color::Yellow,
                TLE => Color::Red,
                RE => Color::Magenta,
                IE => Color::Blue,
            };
        }

        let (r, g, b) = match self {
            AC => (30, 180, 40),
            WA => (210, 138, 4),
            TLE => (220, 42, 42),
            RE => (171, 40, 200),
            IE => (60, 110, 220),
        };
        Color::TrueColor { r, g, b }
    }
}

pub fn judge_icon(judge: JudgeCode) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", judge)
        .on_color(judge.color())
        .bold()
        .color(fg)
}

const BANNER_SIDE: usize = 21;
const BANNER_TITLE: usize = 30;

/// `===== <title centered in 30 cols> =====`
fn banner(fill: char, title: &str) -> String {
    let side: String = std::iter::repeat(fill).take(BANNER_SIDE).collect();
    format!("{}{:^width$}{}", side, title, side, width = BANNER_TITLE)
}

/// Human-facing rendering of a suite run. Write errors on the sink are ignored.
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn suite_started(&mut self, suite: &Suite, total_points: u32) {
        let _ = writeln!(
            self.out,
            "{} ({} cases, {} points)\n",
            suite.name.bright_yellow().bold(),
            suite.cases.len(),
            total_points
        );
    }

    fn case_started(&mut self, case: &TestCase) {
        let title = format!("{} starts", case.name);
        let _ = writeln!(self.out, "{}", banner('=', &title));
        let _ = writeln!(self.out, "{}", case.description);
        let _ = writeln!(self.out, "point value: {}", case.point_value);
    }

    fn case_finished(&mut self, outcome: &CaseOutcome) {
        let elapsed = format!("[{}ms]", outcome.execution_time.as_millis()).dimmed();
        match &outcome.reason {
            None => {
                let _ = writeln!(
                    self.out,
                    "{} {} {}",
                    format!("Test succeeded: {}", outcome.name).green(),
                    judge_icon(outcome.judge),
                    elapsed
                );
            }
            Some(reason) => {
                let _ = writeln!(
                    self.out,
                    "{} {} {}",
                    format!("Test failed: {}", outcome.name).bright_red(),
                    judge_icon(outcome.judge),
                    elapsed
                );
                let _ = writeln!(self.out, "Reason:      {}", reason);
            }
        }
        if let Some(pid) = outcome.leaked_pid {
            let _ = writeln!(
                self.out,
                "{}",
                format!("Failed to kill child {}", pid).bright_red()
            );
        }
        let _ = writeln!(self.out);
    }

    fn cleaned_up(&mut self, scope: CleanupScope, removed: &[PathBuf]) {
        let title = format!("cleaning up ({})", scope);
        let _ = writeln!(self.out, "{}", banner('-', &title));
        for path in removed {
            let _ = writeln!(self.out, "removing {}", path.display());
        }
        let _ = writeln!(self.out, "{}", banner('-', "cleanup done"));
        let _ = writeln!(self.out);
    }

    fn suite_finished(&mut self, report: &SuiteReport) {
        let (cols, _) = terminal::size().unwrap_or((72, 40));
        let _ = writeln!(self.out, "{}", "━".repeat(cols as usize).blue().bold());

        let count: HashMap<JudgeCode, usize> =
            report.outcomes.iter().fold(HashMap::new(), |mut count, o| {
                *count.entry(o.judge).or_default() += 1;
                count
            });
        let mut failed_kinds: Vec<_> = count
            .iter()
            .filter(|(&judge, _)| judge != JudgeCode::AC)
            .collect();
        failed_kinds.sort_by_key(|(&judge, _)| judge.to_string());
        let detail = failed_kinds
            .into_iter()
            .map(|(&judge, &cnt)| {
                format!(
                    "{}{}{}",
                    judge_icon(judge),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white()
                )
            })
            .collect::<Vec<String>>()
            .join(", ");

        let _ = writeln!(self.out, "succeeded: {}", report.succeeded);
        if detail.is_empty() {
            let _ = writeln!(self.out, "failed: {}", report.failed);
        } else {
            let _ = writeln!(self.out, "failed: {} ({})", report.failed, detail);
        }
        let _ = writeln!(self.out, "not-run: {}\n", report.not_run);

        let score = format!("score: {} (out of {})", report.points, report.total_points);
        if report.all_passed() {
            let _ = writeln!(self.out, "{}", score.green().bold());
        } else {
            let _ = writeln!(self.out, "{}", score.bright_red().bold());
        }
    }
}
