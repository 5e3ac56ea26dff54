//! Client root: program prefix, compatibility handshake and the
//! subprocess invocation primitive every command group routes through.

use std::ffi::{OsStr, OsString};
use std::process::Stdio;

use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::commands::{AdbCommands, DeviceCommands, PlanCommands, TraceCommands};
use crate::error::{Result, ToolkitError};
use crate::task::RunningTask;

/// Compatibility level this client requires the toolkit to report.
pub const COMPAT_LEVEL: i64 = 1;

/// Handle to an installed device-testing toolkit.
///
/// The toolkit binary does the actual device work; this client shells out
/// to it with fixed argument conventions and decodes what it prints. A
/// `Toolkit` is constructed from the command used to invoke the binary
/// and verifies at construction time that the installed toolkit speaks a
/// compatible protocol.
#[derive(Debug)]
pub struct Toolkit {
    /// Canonical command prefix prepended to every invocation.
    program: Vec<String>,
}

impl Toolkit {
    /// Create a client for a toolkit installed as a single executable.
    ///
    /// Performs the version handshake against the binary; fails with
    /// [`ToolkitError::Incompatible`] if the toolkit does not report the
    /// required compatibility level.
    pub async fn new(executable: impl Into<String>) -> Result<Self> {
        Self::with_command([executable.into()]).await
    }

    /// Create a client for a toolkit invoked through a command sequence,
    /// e.g. an interpreter followed by a script path.
    pub async fn with_command<I, S>(program: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program: Vec<String> = program.into_iter().map(Into::into).collect();
        if program.is_empty() {
            return Err(ToolkitError::Incompatible(
                "toolkit command is empty".to_string(),
            ));
        }

        let toolkit = Self { program };
        toolkit.check_version().await?;
        Ok(toolkit)
    }

    /// ADB server commands.
    pub fn adb(&self) -> AdbCommands<'_> {
        AdbCommands::new(self)
    }

    /// Device discovery and control commands.
    pub fn devices(&self) -> DeviceCommands<'_> {
        DeviceCommands::new(self)
    }

    /// Touchscreen trace commands.
    pub fn trace(&self) -> TraceCommands<'_> {
        TraceCommands::new(self)
    }

    /// Test plan commands.
    pub fn plan(&self) -> PlanCommands<'_> {
        PlanCommands::new(self)
    }

    async fn check_version(&self) -> Result<()> {
        let raw = self.check_output(["version"]).await?;
        let version: Value = serde_json::from_str(&raw)?;
        match version.get("compat").and_then(Value::as_i64) {
            Some(COMPAT_LEVEL) => Ok(()),
            Some(level) => Err(ToolkitError::Incompatible(format!(
                "toolkit reports compat level {}, this client requires {}",
                level, COMPAT_LEVEL
            ))),
            None => Err(ToolkitError::Incompatible(
                "toolkit version response carries no compat field".to_string(),
            )),
        }
    }

    fn command(&self, args: Vec<OsString>) -> Command {
        debug!("toolkit {:?} {:?}", self.program, args);
        let mut cmd = Command::new(&self.program[0]);
        cmd.args(&self.program[1..]);
        cmd.args(args);
        cmd
    }

    fn collect<I, S>(args: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().map(|a| a.as_ref().to_os_string()).collect()
    }

    /// Run a toolkit command to completion, discarding its output.
    ///
    /// Best-effort: failures are logged and swallowed, so callers get no
    /// status either way.
    pub(crate) async fn call<I, S>(&self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(Self::collect(args));
        match cmd.output().await {
            Ok(output) if !output.status.success() => {
                warn!("toolkit exited with {}", output.status);
            }
            Ok(_) => {}
            Err(e) => warn!("toolkit invocation failed: {}", e),
        }
    }

    /// Run a toolkit command to completion and return its captured
    /// stdout. Non-zero exit fails with [`ToolkitError::CommandFailed`].
    pub(crate) async fn check_output<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(Self::collect(args));
        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolkitError::CommandFailed(format!(
                "toolkit exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    /// Spawn a long-running toolkit command without waiting for it.
    ///
    /// The child's stdin is piped so the returned task can be asked to
    /// stop gracefully; stdout and stderr are inherited.
    pub(crate) fn spawn<I, S>(&self, args: I) -> Result<RunningTask>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(Self::collect(args));
        let child = cmd.stdin(Stdio::piped()).spawn()?;
        Ok(RunningTask::new(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fake_toolkit, fake_toolkit_raw, ECHO_ARGS};

    #[tokio::test]
    async fn test_handshake_accepts_compat_level() {
        let (_dir, script) = fake_toolkit(ECHO_ARGS);
        assert!(Toolkit::new(script.to_str().unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn test_handshake_rejects_wrong_compat_level() {
        let (_dir, script) = fake_toolkit_raw(r#"echo '{"compat": 2}'"#);
        let err = Toolkit::new(script.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, ToolkitError::Incompatible(_)));
    }

    #[tokio::test]
    async fn test_handshake_rejects_missing_compat_field() {
        let (_dir, script) = fake_toolkit_raw(r#"echo '{"version": "2.0"}'"#);
        let err = Toolkit::new(script.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, ToolkitError::Incompatible(_)));
    }

    #[tokio::test]
    async fn test_handshake_rejects_non_json_version() {
        let (_dir, script) = fake_toolkit_raw("echo not json");
        let err = Toolkit::new(script.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, ToolkitError::Decode(_)));
    }

    #[tokio::test]
    async fn test_interpreter_plus_script_prefix() {
        // Same script, but invoked through sh instead of its exec bit.
        let (_dir, script) = fake_toolkit(ECHO_ARGS);
        let toolkit = Toolkit::with_command(["/bin/sh", script.to_str().unwrap()])
            .await
            .unwrap();

        let out = toolkit.check_output(["devices", "list"]).await.unwrap();
        assert_eq!(out, "devices\nlist\n");
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let err = Toolkit::with_command(Vec::<String>::new()).await.unwrap_err();
        assert!(matches!(err, ToolkitError::Incompatible(_)));
    }

    #[tokio::test]
    async fn test_check_output_surfaces_nonzero_exit() {
        let (_dir, script) = fake_toolkit("echo boom >&2; exit 3");
        let toolkit = Toolkit::new(script.to_str().unwrap()).await.unwrap();

        let err = toolkit.check_output(["devices", "list"]).await.unwrap_err();
        match err {
            ToolkitError::CommandFailed(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_call_swallows_failure() {
        let (_dir, script) = fake_toolkit("exit 1");
        let toolkit = Toolkit::new(script.to_str().unwrap()).await.unwrap();

        // No panic, no error surface.
        toolkit.call(["adb", "kill-server"]).await;
    }
}
