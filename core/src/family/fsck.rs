use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;

use super::{check_bytes_eq, Compile};
use crate::{
    assert_case,
    config::FsckConfig,
    serdable::GlobPattern,
    testing::{
        cleanup, Artifact, ArtifactSet, CaseBody, CaseContext, Failure, Suite, TestCase,
    },
};

/// Removes stale build products, then builds with make, falling back to a
/// direct compiler call.
pub struct Build {
    pub stale: Vec<Artifact>,
    pub compile: Compile,
}

#[async_trait]
impl CaseBody for Build {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure> {
        let removed = cleanup::remove_artifacts(ctx.workdir(), &self.stale);
        for path in removed {
            log::info!("Removed stale build product: {}", path.display());
        }
        self.compile.run(ctx).await
    }
}

/// Runs the checker on one disk image and compares exit status, stdout and
/// stderr with the recorded reference.
pub struct FsckCase {
    /// The checker and any leading arguments; the image path is appended.
    pub command: Vec<String>,
    pub fixtures: PathBuf,
    pub image: &'static str,
    pub status: i32,
}

#[async_trait]
impl CaseBody for FsckCase {
    async fn run(&self, ctx: &mut CaseContext) -> Result<(), Failure> {
        let expected_out = ctx.read_file(self.fixtures.join("out").join(self.image))?;
        let expected_err = ctx.read_file(self.fixtures.join("err").join(self.image))?;
        let image = self.fixtures.join("images").join(self.image);

        let mut argv = self.command.clone();
        argv.push(image.to_string_lossy().into_owned());
        let out = ctx.run(&argv).await?;

        assert_case!(
            out.status == Some(self.status),
            "Expect exit status {} but got {:?} (compare with {})",
            self.status,
            out.status,
            self.fixtures.join("err").join(self.image).display()
        );
        check_bytes_eq("Standard output", &expected_out, &out.stdout)?;
        check_bytes_eq("Standard error", &expected_err, &out.stderr)
    }
}

struct Image {
    name: &'static str,
    description: &'static str,
    status: i32,
    point_value: u32,
}

const fn image(
    name: &'static str,
    description: &'static str,
    status: i32,
    point_value: u32,
) -> Image {
    Image {
        name,
        description,
        status,
        point_value,
    }
}

const IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
const EXTRA_TIMEOUT: Duration = Duration::from_secs(5);

const GRADED: &[Image] = &[
    image("Good", "run on a good filesystem", 0, 5),
    image("Goodrefcnt", "run on fs with only good reference counts", 0, 2),
    image("Nonexistant", "run on a nonexistant filesystem", 1, 2),
    image("Badroot", "run on a filesystem with a root directory in bad location", 1, 5),
    image("Badinode", "run on a filesystem with a bad type in an inode", 1, 5),
    image("Badaddr", "run on a filesystem with a bad direct address in an inode", 1, 5),
    image("Badindir1", "run on a filesystem with a bad indirect address in an inode", 1, 5),
    image("Badroot2", "run on a filesystem with a bad root directory in good location", 1, 5),
    image("Badfmt", "run on a filesystem without . or .. directories", 1, 5),
    image("Mrkfree", "run on a filesystem with an inuse direct block marked free", 1, 5),
    image("Indirfree", "run on a filesystem with an inuse indirect block marked free", 1, 5),
    image("Mrkused", "run on a filesystem with a free block marked used", 1, 5),
    image("Addronce", "run on a filesystem with an address used more than once", 1, 5),
    image("Imrkused", "run with inode marked used, but not referenced in a directory", 1, 5),
    image("Imrkfree", "run with inode marked free, but referenced in a directory", 1, 5),
    image("Badrefcnt", "run on fs which has an inode with a bad reference count", 1, 5),
    image("Badindir2", "run on a filesystem with a bad indirect address in an inode", 1, 5),
    image("Dironce", "run on fs with a directory appearing more than once", 1, 5),
    image("Goodrm", "run on good fs with a file removed and a new directory created", 0, 5),
    image("Goodrm2", "run on good fs with a new directory created and then a file removed", 0, 3),
    image("Goodlink", "run on good fs with some hard links and a linked file removed", 0, 3),
    image("Goodlarge", "run on large good fs", 0, 5),
];

const EXTRA: &[Image] = &[
    image(
        "Mismatch",
        "**extra** run on a filesystem with .. pointing to the wrong directory",
        1,
        5,
    ),
    image("Loop", "**extra** run on a filesystem with a loop in directory tree", 1, 5),
];

pub fn suite(cfg: &FsckConfig) -> anyhow::Result<Suite> {
    let objects = Artifact::from(GlobPattern::parse("*.o")?);
    let executable = Artifact::file(&cfg.executable);

    let build = TestCase::new(
        "build",
        "builds xv6_fsck",
        Build {
            stale: vec![executable.clone(), objects.clone()],
            compile: Compile {
                argv: cfg.make.clone(),
                fallback: Some(cfg.compile.clone()),
            },
        },
    );

    let mut suite = Suite::new("xv6_fsck").case(build);

    let images = GRADED.iter().map(|img| (img, IMAGE_TIMEOUT));
    let extra = EXTRA.iter().map(|img| (img, EXTRA_TIMEOUT));
    let extra = extra.filter(|_| cfg.include_extra);
    for (img, timeout) in images.chain(extra) {
        suite = suite.case(
            TestCase::new(
                img.name,
                img.description,
                FsckCase {
                    command: vec![cfg.executable.clone()],
                    fixtures: cfg.fixtures.clone(),
                    image: img.name,
                    status: img.status,
                },
            )
            .point_value(img.point_value)
            .timeout(timeout),
        );
    }

    Ok(suite.artifacts(ArtifactSet {
        per_case: vec![],
        per_suite: vec![executable, objects],
    }))
}
