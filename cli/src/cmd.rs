pub mod init;
pub mod list;
pub mod run;

use std::path::PathBuf;

use grader_core::{Config, Family};

use crate::util;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Config file to use instead of the nearest grader.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the program under test
    #[arg(short = 'C', long, global = true)]
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Init(init::Args),
    List(list::Args),

    #[command(alias("r"))]
    Run(run::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Init(args) => init::exec(args, self),
            List(args) => list::exec(args, self),
            Run(args) => run::exec(args, self).await,
        }
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        let cfg = match &self.config {
            Some(path) => Config::from_toml_file(path.clone())?,
            None => Config::from_file_finding_in_ancestors(util::current_dir())?,
        };
        if let Some(path) = &cfg.source_config_file {
            log::info!(
                "Loaded config: {}",
                util::replace_homedir_to_tilde(path).to_string_lossy()
            );
        }
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum ArgFamily {
    Reverse,
    Wistar,
    Fsck,
}

impl From<ArgFamily> for Family {
    fn from(value: ArgFamily) -> Self {
        use ArgFamily::*;
        match value {
            Reverse => Family::Reverse,
            Wistar => Family::Wistar,
            Fsck => Family::Fsck,
        }
    }
}

impl From<&ArgFamily> for Family {
    fn from(&value: &ArgFamily) -> Self {
        value.into()
    }
}
