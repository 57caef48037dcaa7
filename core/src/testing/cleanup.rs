use std::path::{Path, PathBuf};

use crate::serdable::GlobPattern;

/// A transient file the harness may delete, relative to the working dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    File(PathBuf),
    Glob(GlobPattern),
}

impl Artifact {
    pub fn file(name: impl Into<PathBuf>) -> Self {
        Self::File(name.into())
    }
}

impl From<GlobPattern> for Artifact {
    fn from(pat: GlobPattern) -> Self {
        Self::Glob(pat)
    }
}

/// `per_case` is removed after every case, `per_suite` once after the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    pub per_case: Vec<Artifact>,
    pub per_suite: Vec<Artifact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CleanupScope {
    #[strum(serialize = "case")]
    Case,
    #[strum(serialize = "suite")]
    Suite,
}

/// Removes every regular file the artifacts name and returns what was actually removed.
/// Missing files are skipped; anything else that goes wrong is logged and skipped.
pub fn remove_artifacts<'a>(
    workdir: &Path,
    artifacts: impl IntoIterator<Item = &'a Artifact>,
) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    for artifact in artifacts {
        let candidates = match artifact {
            Artifact::File(name) => vec![workdir.join(name)],
            Artifact::Glob(pat) => match fsutil::find_files_matching(workdir, pat) {
                Ok(paths) => paths,
                Err(e) => {
                    log::warn!("Skipping cleanup of '{}': {}", pat.as_str(), e);
                    continue;
                }
            },
        };
        for path in candidates {
            match fsutil::remove_file_if_exists(&path) {
                Ok(true) => removed.push(path),
                Ok(false) => {}
                Err(e) => log::warn!("Skipping cleanup of {}: {}", e.path().display(), e),
            }
        }
    }
    removed
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_remove_listed_and_matching_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let touch = |name: &str| fsutil::write(dir.path().join(name), b"x").unwrap();
        touch("inputfile");
        touch("proc.o");
        touch("fs.o");
        touch("proc.c");

        let artifacts = vec![
            Artifact::file("inputfile"),
            Artifact::file("outputfile"), // absent: not an error
            GlobPattern::parse("*.o").unwrap().into(),
        ];
        let removed = remove_artifacts(dir.path(), &artifacts);

        assert_eq!(
            removed,
            vec![
                dir.path().join("inputfile"),
                dir.path().join("fs.o"),
                dir.path().join("proc.o"),
            ]
        );
        assert!(dir.path().join("proc.c").is_file());
    }

    #[test]
    fn should_not_remove_directories() {
        let dir = tempfile::tempdir().unwrap();
        fsutil::mkdir_all(dir.path().join("reverse")).unwrap();

        let removed = remove_artifacts(dir.path(), &[Artifact::file("reverse")]);
        assert!(removed.is_empty());
        assert!(dir.path().join("reverse").is_dir());
    }

    #[test]
    fn absolute_paths_should_be_taken_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let abs = dir.path().join("a.txt");
        fsutil::write(&abs, b"").unwrap();

        let removed = remove_artifacts(Path::new("/nonexistent"), &[Artifact::File(abs.clone())]);
        assert_eq!(removed, vec![abs]);
    }
}
