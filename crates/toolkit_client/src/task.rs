//! Control over a long-running toolkit task

use std::process::ExitStatus;

use tokio::io::AsyncWriteExt;
use tokio::process::Child;
use tracing::debug;

use crate::error::{Result, ToolkitError};

/// The control line a task reads from its stdin as a request to shut
/// down gracefully.
const QUIT_LINE: &[u8] = b"please quit\n";

/// A long-running toolkit task: a trace recording or replay, an input
/// mirroring session, or a test plan run.
///
/// Each handle owns exactly one spawned toolkit process, with its stdin
/// piped so the task can be asked to stop. A task runs until it exits on
/// its own, honors [`stop`](RunningTask::stop), or is
/// [`kill`](RunningTask::kill)ed; once finished, only the exit status can
/// still be queried.
pub struct RunningTask {
    child: Child,
}

impl RunningTask {
    pub(crate) fn new(child: Child) -> Self {
        Self { child }
    }

    /// Ask the task to stop gracefully and wait until it exits.
    ///
    /// Writes a single control line to the task's stdin and then blocks
    /// until the process is gone. Fails with
    /// [`ToolkitError::ProcessControl`] if the control line cannot be
    /// delivered (the process may already be gone, or may have closed its
    /// stdin); callers can escalate to [`kill`](RunningTask::kill).
    pub async fn stop(&mut self) -> Result<ExitStatus> {
        let mut stdin = self.child.stdin.take().ok_or_else(|| {
            ToolkitError::ProcessControl("task stdin is already closed".to_string())
        })?;

        debug!("sending quit request to task");
        stdin
            .write_all(QUIT_LINE)
            .await
            .map_err(|e| ToolkitError::ProcessControl(format!("failed to send quit request: {}", e)))?;
        stdin
            .shutdown()
            .await
            .map_err(|e| ToolkitError::ProcessControl(format!("failed to close task stdin: {}", e)))?;
        drop(stdin);

        self.wait().await
    }

    /// Return true if the task has already exited. Never blocks.
    pub fn is_finished(&mut self) -> Result<bool> {
        let status = self
            .child
            .try_wait()
            .map_err(|e| ToolkitError::ProcessControl(e.to_string()))?;
        Ok(status.is_some())
    }

    /// Forcefully terminate the task. Sends the termination signal and
    /// returns without waiting for the process to exit.
    pub fn kill(&mut self) -> Result<()> {
        self.child
            .start_kill()
            .map_err(|e| ToolkitError::ProcessControl(e.to_string()))
    }

    /// Wait until the task exits and return its exit status.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        self.child
            .wait()
            .await
            .map_err(|e| ToolkitError::ProcessControl(e.to_string()))
    }
}
