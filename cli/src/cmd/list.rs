use grader_core::action;

use super::{ArgFamily, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(value_enum)]
    pub family: ArgFamily,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = global_args.load_config()?;
    action::list_cases(args.family.into(), &cfg)
}
