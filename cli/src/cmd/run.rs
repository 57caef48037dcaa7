use std::path::PathBuf;

use grader_core::action::{self, RunOverrides};

use super::{ArgFamily, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(value_enum)]
    pub family: ArgFamily,

    /// Keep running after a failed case
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Remove generated files and build products
    #[arg(short = 'c', long)]
    pub cleanup: bool,

    /// Also write the report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = global_args.load_config()?;
    let overrides = RunOverrides {
        all: args.all,
        cleanup: args.cleanup,
        workdir: global_args.workdir.clone(),
        json_report: args.json.clone(),
    };

    let _ = action::grade(args.family.into(), &cfg, &overrides).await?;
    Ok(())
}
