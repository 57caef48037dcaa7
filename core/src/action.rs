use std::path::{Path, PathBuf};

use anyhow::{ensure, Context as _, Result};
use colored::Colorize;

use crate::config::Config;
use crate::family::Family;
use crate::style::ConsoleReporter;
use crate::testing::{SuiteOptions, SuiteReport};

/// Command-line switches layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Run every case even after a failure.
    pub all: bool,
    pub cleanup: bool,
    pub workdir: Option<PathBuf>,
    pub json_report: Option<PathBuf>,
}

pub fn suite_options(cfg: &Config, overrides: &RunOverrides) -> SuiteOptions {
    let mut opts = cfg.suite.options(cfg.base_dir());
    if overrides.all {
        opts.short_circuit = false;
    }
    if overrides.cleanup {
        opts.cleanup = true;
    }
    if let Some(dir) = &overrides.workdir {
        opts.workdir = dir.clone();
    }
    opts
}

pub async fn grade(family: Family, cfg: &Config, overrides: &RunOverrides) -> Result<SuiteReport> {
    let opts = suite_options(cfg, overrides);
    ensure!(
        opts.workdir.is_dir(),
        "Working directory does not exist: {}",
        opts.workdir.to_string_lossy()
    );

    let suite = family
        .suite(cfg)
        .with_context(|| format!("Failed to prepare the {} suite", family))?;
    log::info!(
        "Running {} ({} cases) in {}",
        suite.name,
        suite.cases.len(),
        opts.workdir.to_string_lossy()
    );

    let mut reporter = ConsoleReporter::stdout();
    let report = suite.run(&opts, &mut reporter).await?;

    if let Some(path) = &overrides.json_report {
        save_report(path, &report)?;
    }
    Ok(report)
}

pub fn save_report(path: impl AsRef<Path>, report: &SuiteReport) -> Result<()> {
    fsutil::write_json_with_mkdir(path.as_ref(), report).context("Failed to save the report")
}

pub fn list_cases(family: Family, cfg: &Config) -> Result<()> {
    let suite = family.suite(cfg)?;
    for (i, case) in suite.cases.iter().enumerate() {
        println!(
            "{:>3}. {} {} [{} pts, {}s]",
            i + 1,
            case.name.bold(),
            format!("({})", case.description).dimmed(),
            case.point_value,
            case.timeout.as_secs()
        );
    }
    if let Some(total) = suite.total_points() {
        println!("total: {} points", total);
    }
    Ok(())
}

pub fn init_config_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(Config::FILENAME);
    ensure!(
        !path.exists(),
        "Config file already exists: {}",
        path.to_string_lossy()
    );
    fsutil::write_with_mkdir(&path, Config::example_toml())
        .context("Failed to write the example config")?;
    Ok(path)
}
