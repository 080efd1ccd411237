use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, FdFlag, OFlag};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::{dup2, pipe2, Pid};
use std::{
    os::fd::{AsRawFd, RawFd},
    path::{Path, PathBuf},
    process::Stdio,
    sync::{Arc, Mutex},
    time::Instant,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    net::unix::pipe,
    process::Command,
    task::JoinHandle,
    time::{self, Duration},
};
use tracing::{debug, warn};

use crate::{error::Error, languages::CommandSpec};

/// Wall-clock bound applied to every spawned process, compile steps included.
pub const EXECUTION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Bytes kept per captured stream. Anything past this is read and dropped.
pub const MAX_CAPTURE_BYTES: usize = 1 << 20;

/// Descriptor a [`ResultChannel::ResultFd`] program writes its result to.
pub const RESULT_FD: RawFd = 3;

const FALLBACK_PATH: &str = "/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin";

/// Where a run step reports the value it produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultChannel {
    /// Standard output is the result.
    #[default]
    Stdout,
    /// Standard output goes to the null device and the result is read from
    /// [`RESULT_FD`], the inherited write end of a pipe.
    ResultFd,
}

/// How a supervised process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Completed,
    NonZeroExit(Option<i32>),
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub status: ProcessStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Spawns and supervises one process per compile or run step.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    path_env: String,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        let path_env = std::env::var("PATH").unwrap_or_else(|_| FALLBACK_PATH.to_string());
        Self { path_env }
    }

    /// Run `step` inside `cwd` until it exits or [`EXECUTION_TIMEOUT`] elapses.
    ///
    /// Only failures to start the process are errors; everything the process
    /// itself does is reported through [`ProcessOutcome`].
    pub async fn run(
        &self,
        step: &CommandSpec,
        cwd: &Path,
        env: &[(String, String)],
    ) -> Result<ProcessOutcome, Error> {
        self.run_with_channel(step, cwd, env, ResultChannel::Stdout)
            .await
    }

    /// Like [`run`](Self::run), with `ProcessOutcome::stdout` taken from
    /// `channel`. Whatever the process group still holds is killed once the
    /// main process is gone.
    pub async fn run_with_channel(
        &self,
        step: &CommandSpec,
        cwd: &Path,
        env: &[(String, String)],
        channel: ResultChannel,
    ) -> Result<ProcessOutcome, Error> {
        let program = self.resolve(&step.command, cwd)?;

        debug!("Runner execute - Command: {}", program.display());
        debug!("Runner execute - Args: {:?}", step.args);
        debug!("Runner execute - Working dir: {:?}", cwd);

        let mut command = Command::new(&program);
        command
            .args(&step.args)
            .env_clear()
            .envs(env.iter().map(|(k, v)| (k, v)))
            .env("PATH", &self.path_env)
            .env("HOME", cwd)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);

        let result_pipe = match channel {
            ResultChannel::Stdout => {
                command.stdout(Stdio::piped());
                None
            }
            ResultChannel::ResultFd => {
                command.stdout(Stdio::null());
                let (read_end, write_end) = pipe2(OFlag::O_CLOEXEC)
                    .map_err(|e| Error::Spawn(format!("{}: result pipe: {}", step.command, e)))?;
                let raw = write_end.as_raw_fd();
                // SAFETY: dup2 and fcntl are async-signal-safe and allocate nothing
                unsafe {
                    command.pre_exec(move || {
                        if raw != RESULT_FD {
                            dup2(raw, RESULT_FD)?;
                        }
                        fcntl(RESULT_FD, FcntlArg::F_SETFD(FdFlag::empty()))?;
                        Ok(())
                    });
                }
                Some((read_end, write_end))
            }
        };

        let start_time = Instant::now();
        let mut child = command
            .spawn()
            .map_err(|e| Error::Spawn(format!("{}: {}", step.command, e)))?;
        // The process leads its own group, so this reaches every descendant
        let group = child.id().map(|id| Pid::from_raw(id as i32));

        let stdout = Arc::new(Mutex::new(Vec::new()));
        let stderr = Arc::new(Mutex::new(Vec::new()));
        let result_reader = match result_pipe {
            Some((read_end, write_end)) => {
                drop(write_end);
                match pipe::Receiver::from_owned_fd(read_end) {
                    Ok(receiver) => Some(drain(receiver, stdout.clone())),
                    Err(e) => {
                        if let Some(group) = group {
                            kill_group(group);
                        }
                        return Err(Error::Spawn(format!(
                            "{}: result pipe: {}",
                            step.command, e
                        )));
                    }
                }
            }
            None => child.stdout.take().map(|pipe| drain(pipe, stdout.clone())),
        };
        let readers = [
            result_reader,
            child.stderr.take().map(|pipe| drain(pipe, stderr.clone())),
        ];

        let status = match time::timeout(EXECUTION_TIMEOUT, child.wait()).await {
            Ok(Ok(exit)) if exit.success() => ProcessStatus::Completed,
            Ok(Ok(exit)) => ProcessStatus::NonZeroExit(exit.code()),
            Ok(Err(e)) => {
                warn!("Failed to wait for process {}: {}", step.command, e);
                ProcessStatus::NonZeroExit(None)
            }
            Err(_) => ProcessStatus::TimedOut,
        };
        let elapsed = start_time.elapsed();

        if let Some(group) = group {
            kill_group(group);
        }
        if status == ProcessStatus::TimedOut {
            let _ = child.kill().await;
        }

        for reader in readers.into_iter().flatten() {
            // Pipes close once the group is gone; don't hang on stray holders
            if time::timeout(Duration::from_millis(250), reader).await.is_err() {
                debug!("Output reader did not finish after process exit");
            }
        }

        let outcome = ProcessOutcome {
            status,
            stdout: take_lossy(&stdout),
            stderr: take_lossy(&stderr),
            elapsed,
        };
        debug!(
            "Runner finished - Status: {:?}, elapsed: {}ms",
            outcome.status,
            outcome.elapsed_ms()
        );
        Ok(outcome)
    }

    fn resolve(&self, command: &str, cwd: &Path) -> Result<PathBuf, Error> {
        if let Some(local) = command.strip_prefix("./") {
            return Ok(cwd.join(local));
        }
        which::which_in(command, Some(&self.path_env), cwd)
            .map_err(|_| Error::CommandNotFound(command.to_string()))
    }
}

fn drain<R>(mut pipe: R, sink: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Ok(mut buffer) = sink.lock() {
                        let room = MAX_CAPTURE_BYTES.saturating_sub(buffer.len());
                        buffer.extend_from_slice(&chunk[..n.min(room)]);
                    }
                }
            }
        }
    })
}

fn kill_group(group: Pid) {
    match killpg(group, Signal::SIGKILL) {
        // Nothing left in the group
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill process group {}: {}", group, e),
    }
}

fn take_lossy(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    match buffer.lock() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}
