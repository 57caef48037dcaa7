use std::{
    io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    process::{Child, Command},
};

use super::{deadline::with_deadline, result::Failure};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to kill child {}: {reason}", display_pid(.pid))]
pub struct Unreclaimed {
    pub pid: Option<u32>,
    pub reason: String,
}

fn display_pid(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => pid.to_string(),
        None => "<unknown>".to_owned(),
    }
}

/// Launches external programs one at a time and keeps hold of the one in flight.
///
/// The in-flight child is stored here rather than inside the future awaiting it,
/// so when a deadline drops that future the child is still reachable and can be
/// handed to [`Supervisor::reclaim`].
#[derive(Debug)]
pub struct Supervisor {
    workdir: PathBuf,
    active: Option<Child>,
}

impl Supervisor {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            active: None,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_pid(&self) -> Option<u32> {
        self.active.as_ref().and_then(Child::id)
    }

    /// Runs `argv` to completion and returns whatever it produced, whatever its exit status.
    pub async fn run<S: AsRef<str>>(&mut self, argv: &[S]) -> Result<ProcessOutput, Failure> {
        self.communicate(argv, None).await
    }

    pub async fn run_with_input<S: AsRef<str>>(
        &mut self,
        argv: &[S],
        input: &[u8],
    ) -> Result<ProcessOutput, Failure> {
        self.communicate(argv, Some(input)).await
    }

    /// Like [`Supervisor::run`] but any status other than 0 is a `ProcessFailed`.
    pub async fn run_checked<S: AsRef<str>>(
        &mut self,
        argv: &[S],
    ) -> Result<ProcessOutput, Failure> {
        let output = self.run(argv).await?;
        if output.success() {
            return Ok(output);
        }
        Err(Failure::ProcessFailed {
            argv: argv.iter().map(|s| s.as_ref().to_owned()).collect(),
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn communicate<S: AsRef<str>>(
        &mut self,
        argv: &[S],
        input: Option<&[u8]>,
    ) -> Result<ProcessOutput, Failure> {
        let cmdline = argv
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");
        let Some((program, args)) = argv.split_first() else {
            return Err(Failure::io(
                "Failed to spawn",
                io::Error::new(io::ErrorKind::InvalidInput, "empty command line"),
            ))
        };

        let child = Command::new(program.as_ref())
            .args(args.iter().map(|s| s.as_ref()))
            .current_dir(&self.workdir)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Failure::io(format!("Failed to spawn '{}'", cmdline), e))?;
        log::debug!("Spawned '{}' (pid={:?})", cmdline, child.id());

        let child = self.active.insert(child);
        let stdin = child.stdin.take();
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Failure::io("Failed to open stdout", io::ErrorKind::BrokenPipe.into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Failure::io("Failed to open stderr", io::ErrorKind::BrokenPipe.into()))?;

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        // stdin is closed when this block finishes, which is what lets filters see EOF.
        let feed = async move {
            let (Some(mut stdin), Some(data)) = (stdin, input) else {
                return Ok(())
            };
            match stdin.write_all(data).await {
                // the child is free to exit without reading its input
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                res => res,
            }
        };

        let (_, _, _, exit_status) = tokio::try_join!(
            feed,
            stdout.read_to_end(&mut stdout_buf),
            stderr.read_to_end(&mut stderr_buf),
            child.wait(),
        )
        .map_err(|e| Failure::io(format!("Failed to communicate with '{}'", cmdline), e))?;

        self.active = None;
        Ok(ProcessOutput {
            status: exit_status.code(),
            stdout: stdout_buf,
            stderr: stderr_buf,
        })
    }

    /// Kills and reaps the in-flight child, if there is one, giving up after `grace`.
    pub async fn reclaim(&mut self, grace: Duration) -> Result<(), Unreclaimed> {
        let Some(mut child) = self.active.take() else {
            return Ok(())
        };
        let pid = child.id();
        if let Ok(Some(_)) = child.try_wait() {
            return Ok(());
        }

        let res = with_deadline(grace, async {
            child
                .kill()
                .await
                .map_err(|e| Failure::io("Failed to kill", e))
        })
        .await;

        match res {
            Ok(()) => {
                log::debug!("Reclaimed child (pid={:?})", pid);
                Ok(())
            }
            Err(e) => {
                let err = Unreclaimed {
                    pid,
                    reason: e.to_string(),
                };
                log::warn!("{}", err);
                Err(err)
            }
        }
    }
}
