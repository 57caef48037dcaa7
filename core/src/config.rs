use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};

use crate::family::argv;
use crate::serdable::GlobPattern;
use crate::testing::{Artifact, SuiteOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub suite: SuiteConfig,
    pub reverse: ReverseConfig,
    pub wistar: WistarConfig,
    pub fsck: FsckConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    /// Where the program under test lives and runs.
    pub workdir: PathBuf,
    /// Stop at the first failed case.
    pub short_circuit: bool,
    pub cleanup: bool,
    pub kill_grace_secs: u64,
    /// Removed along with the build products when cleanup is on.
    pub extra_artifacts: Vec<GlobPattern>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            short_circuit: true,
            cleanup: false,
            kill_grace_secs: 5,
            extra_artifacts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReverseConfig {
    pub compile: Vec<String>,
    pub executable: String,
    pub include_stress: bool,
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            compile: argv(&["gcc", "-Wall", "-Werror", "-o", "reverse", "reverse.c"]),
            executable: "./reverse".to_owned(),
            include_stress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WistarConfig {
    pub compile: Vec<String>,
    pub executable: String,
    pub include_stress: bool,
}

impl Default for WistarConfig {
    fn default() -> Self {
        Self {
            compile: argv(&["gcc", "-Wall", "-Werror", "-o", "wis-tar", "wis-tar.c"]),
            executable: "./wis-tar".to_owned(),
            include_stress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsckConfig {
    pub make: Vec<String>,
    /// Used when `make` fails.
    pub compile: Vec<String>,
    pub executable: String,
    /// Holds `images/`, `out/` and `err/`.
    pub fixtures: PathBuf,
    pub include_extra: bool,
}

impl Default for FsckConfig {
    fn default() -> Self {
        Self {
            make: argv(&["make", "xv6_fsck"]),
            compile: argv(&["gcc", "xv6_fsck.c", "-o", "xv6_fsck"]),
            executable: "./xv6_fsck".to_owned(),
            fixtures: PathBuf::from("tests"),
            include_extra: true,
        }
    }
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &'static str = "grader.toml";

    pub fn example_toml() -> String {
        Asset::get(Self::FILENAME)
            .map(|file| String::from_utf8_lossy(file.data.as_ref()).into_owned())
            .unwrap_or_default()
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// Loads the nearest `grader.toml`, or the built-in defaults when there is none.
    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        match Self::find_file_in_ancestors(cur_dir) {
            Some(path) => Self::from_toml_file(path),
            None => {
                log::info!("No {} found; using defaults", Self::FILENAME);
                Ok(Self::default())
            }
        }
    }

    /// Relative paths in the config are relative to the file that defined them.
    pub fn base_dir(&self) -> &Path {
        self.source_config_file
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."))
    }
}

impl SuiteConfig {
    pub fn kill_grace(&self) -> Duration {
        Duration::from_secs(self.kill_grace_secs)
    }

    pub fn options(&self, base_dir: &Path) -> SuiteOptions {
        SuiteOptions {
            workdir: base_dir.join(&self.workdir),
            short_circuit: self.short_circuit,
            cleanup: self.cleanup,
            kill_grace: self.kill_grace(),
            extra_artifacts: self
                .extra_artifacts
                .iter()
                .cloned()
                .map(Artifact::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn example_toml_should_equal_defaults() {
        let toml = Config::example_toml();
        assert!(!toml.is_empty());
        let cfg = dbg!(Config::from_toml(&toml)).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_toml_should_fill_in_defaults() {
        let cfg = Config::from_toml(
            r#"
            [suite]
            cleanup = true
            extra_artifacts = ["*.tmp"]

            [reverse]
            include_stress = false
            "#,
        )
        .unwrap();

        assert!(cfg.suite.cleanup);
        assert!(cfg.suite.short_circuit);
        assert_eq!(cfg.suite.kill_grace(), Duration::from_secs(5));
        assert!(cfg.suite.extra_artifacts[0].matches("a.tmp"));
        assert!(!cfg.reverse.include_stress);
        assert_eq!(cfg.reverse.executable, "./reverse");
        assert_eq!(cfg.fsck, FsckConfig::default());
    }

    #[test]
    fn unknown_keys_and_bad_globs_are_rejected() {
        assert!(Config::from_toml("[suite]\nshort_circut = false\n").is_err());
        assert!(Config::from_toml("[suite]\nextra_artifacts = [\"[a\"]\n").is_err());
    }

    #[test]
    fn should_find_nearest_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fsutil::mkdir_all(&nested).unwrap();
        assert_eq!(Config::find_file_in_ancestors(&nested), None);

        let path = dir.path().join("a").join(Config::FILENAME);
        fsutil::write(&path, "[suite]\nworkdir = \"p1\"\n").unwrap();
        assert_eq!(Config::find_file_in_ancestors(&nested), Some(path.clone()));

        let cfg = Config::from_file_finding_in_ancestors(&nested).unwrap();
        assert_eq!(cfg.source_config_file.as_deref(), Some(path.as_path()));
        let opts = cfg.suite.options(cfg.base_dir());
        assert_eq!(opts.workdir, dir.path().join("a").join("p1"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::from_file_finding_in_ancestors(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.base_dir(), Path::new("."));
    }
}
