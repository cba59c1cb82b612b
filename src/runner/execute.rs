use std::fmt;
use std::io::PipeWriter;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::runner::parse::parse_test_output;
use crate::runner::pump::OutputPump;
use crate::runner::result::RunResult;

/// How often the runner checks the subprocess and the cancel token.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Handle to a launched test subprocess.
pub trait TestProcess {
    /// Non-blocking completion check; `Some(code)` once exited.
    ///
    /// # Errors
    ///
    /// Returns an error if the process status cannot be queried.
    fn try_wait(&mut self) -> std::io::Result<Option<i32>>;

    /// Terminate the subprocess and reap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be killed.
    fn kill(&mut self) -> std::io::Result<()>;
}

/// External launcher seam: spawns one target's subprocess with its output
/// wired to the given sink.
pub trait Launcher {
    /// Start `target` asynchronously with the given arguments.
    ///
    /// The launcher owns the sink; its write end must close when the
    /// subprocess exits or is killed so the output drain can observe
    /// end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] if the subprocess cannot be spawned.
    fn spawn(
        &self,
        target: &str,
        args: &[String],
        output: PipeWriter,
    ) -> Result<Box<dyn TestProcess>, ExecError>;
}

/// Build the gtest exclusion argument for a target, if it has exclusions.
pub fn gtest_filter_arg(exclusions: &[String]) -> Option<String> {
    if exclusions.is_empty() {
        None
    } else {
        Some(format!("--gtest_filter=-{}", exclusions.join(":")))
    }
}

/// Launcher that runs `<out_directory>/<target>` directly on the host.
pub struct ProcessLauncher {
    pub out_directory: PathBuf,
    pub device_id: Option<String>,
}

impl ProcessLauncher {
    pub fn new(out_directory: PathBuf) -> Self {
        Self {
            out_directory,
            device_id: None,
        }
    }
}

impl Launcher for ProcessLauncher {
    fn spawn(
        &self,
        target: &str,
        args: &[String],
        output: PipeWriter,
    ) -> Result<Box<dyn TestProcess>, ExecError> {
        let binary = self.out_directory.join(target);
        let stderr_sink = output.try_clone().map_err(|e| ExecError {
            kind: ExecErrorKind::SpawnFailed,
            target_name: target.to_owned(),
            message: "failed to clone output sink".into(),
            detail: Some(e.to_string()),
        })?;

        let mut command = Command::new(&binary);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::from(output))
            .stderr(Stdio::from(stderr_sink))
            .args(args);
        if let Some(device_id) = &self.device_id {
            command.env("UTR_DEVICE_ID", device_id);
        }

        let child = command.spawn().map_err(|e| ExecError {
            kind: ExecErrorKind::SpawnFailed,
            target_name: target.to_owned(),
            message: format!("failed to start {}", binary.display()),
            detail: Some(e.to_string()),
        })?;
        Ok(Box::new(child))
    }
}

impl TestProcess for Child {
    fn try_wait(&mut self) -> std::io::Result<Option<i32>> {
        Ok(Child::try_wait(self)?.map(|status| status.code().unwrap_or(-1)))
    }

    fn kill(&mut self) -> std::io::Result<()> {
        Child::kill(self)?;
        // Reap so the kill leaves no zombie behind.
        let _ = self.wait();
        Ok(())
    }
}

/// Runs one target at a time: spawn, stream, wait, parse.
pub struct ProcessRunner<'a> {
    launcher: &'a dyn Launcher,
    cancel: CancelToken,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(launcher: &'a dyn Launcher, cancel: CancelToken) -> Self {
        Self { launcher, cancel }
    }

    /// Run a single target with the given sub-test exclusions.
    ///
    /// The subprocess's output is streamed live and buffered by an
    /// [`OutputPump`] while this call blocks on completion. On
    /// cancellation the teardown order is fixed: kill the subprocess,
    /// close the pipe's write end, join the drain thread, close the read
    /// end. The pump makes the sequence idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] if the target cannot be spawned, its status
    /// cannot be queried, or the run is cancelled.
    pub fn run_target(&self, target: &str, exclusions: &[String]) -> Result<RunResult, ExecError> {
        let (mut pump, sink) = OutputPump::new().map_err(|e| ExecError {
            kind: ExecErrorKind::Io,
            target_name: target.to_owned(),
            message: "failed to create output pipe".into(),
            detail: Some(e.to_string()),
        })?;

        let mut args = Vec::new();
        if let Some(filter) = gtest_filter_arg(exclusions) {
            args.push(filter);
        }

        println!("Starting {target}");
        let mut process = match self.launcher.spawn(target, &args, sink) {
            Ok(process) => process,
            Err(e) => {
                pump.finish();
                return Err(e);
            }
        };

        loop {
            if self.cancel.is_cancelled() {
                let _ = process.kill();
                pump.finish();
                return Err(ExecError {
                    kind: ExecErrorKind::Aborted,
                    target_name: target.to_owned(),
                    message: "test run stopped via manual exit".into(),
                    detail: None,
                });
            }
            match process.try_wait() {
                Ok(Some(_exit_code)) => break,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = process.kill();
                    pump.finish();
                    return Err(ExecError {
                        kind: ExecErrorKind::Io,
                        target_name: target.to_owned(),
                        message: "failed to poll subprocess".into(),
                        detail: Some(e.to_string()),
                    });
                }
            }
        }

        // Pass/fail comes from the parsed output, not the exit code.
        let output = pump.finish();
        Ok(parse_test_output(&output, target))
    }
}

/// Error from executing a single target.
#[derive(Debug, Clone)]
pub struct ExecError {
    pub kind: ExecErrorKind,
    pub target_name: String,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.target_name, self.message)
    }
}

/// Classification of per-target execution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecErrorKind {
    /// The launcher could not start the subprocess.
    SpawnFailed,
    /// The run was cancelled externally.
    Aborted,
    /// Pipe or process-status I/O failed.
    Io,
}

impl fmt::Display for ExecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed => write!(f, "spawn failed"),
            Self::Aborted => write!(f, "aborted"),
            Self::Io => write!(f, "io error"),
        }
    }
}
