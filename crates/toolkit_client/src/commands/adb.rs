//! ADB server management through the toolkit

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::toolkit::Toolkit;

/// State of a local ADB server, as reported by `adb check-server`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerState {
    /// Hostname the server listens on, normally `localhost`.
    pub host: String,
    /// POSIX port of the server, default 5037.
    pub port: u16,
    /// Version code of the adb program (the xx in 1.0.xx).
    pub version: u32,
    /// Whether the server can currently be communicated with.
    pub online: bool,
}

/// Location of the adb executable from the Android SDK.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdbLocation {
    /// Path to the adb binary. May contain non-ASCII characters,
    /// e.g. under a localized Windows user directory.
    pub adb: PathBuf,
}

/// ADB server commands.
pub struct AdbCommands<'a> {
    toolkit: &'a Toolkit,
}

impl<'a> AdbCommands<'a> {
    pub(crate) fn new(toolkit: &'a Toolkit) -> Self {
        Self { toolkit }
    }

    /// Query the state of the local ADB server.
    pub async fn check_server(&self) -> Result<Vec<ServerState>> {
        let raw = self.toolkit.check_output(["adb", "check-server"]).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Start the local ADB server. Best-effort; failures are not
    /// surfaced.
    pub async fn start_server(&self) {
        // The toolkit brings the server up as a side effect of
        // check-server; there is no separate start subcommand on the wire.
        self.toolkit.call(["adb", "check-server"]).await;
    }

    /// Kill the local ADB server. Best-effort; failures are not
    /// surfaced.
    pub async fn kill_server(&self) {
        self.toolkit.call(["adb", "kill-server"]).await;
    }

    /// Locate the adb executable of the installed Android SDK.
    pub async fn detect_adb(&self) -> Result<AdbLocation> {
        let raw = self.toolkit.check_output(["adb", "detectadb"]).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ToolkitError;
    use crate::testutil::{capture_toolkit, captured_args, json_toolkit};
    use crate::toolkit::Toolkit;

    async fn connect(path: &std::path::Path) -> Toolkit {
        Toolkit::new(path.to_str().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_check_server_decodes_state() {
        let (_dir, script) =
            json_toolkit(r#"[{"host": "localhost", "version": 36, "port": 5037, "online": true}]"#);
        let toolkit = connect(&script).await;

        let servers = toolkit.adb().check_server().await.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].host, "localhost");
        assert_eq!(servers[0].port, 5037);
        assert_eq!(servers[0].version, 36);
        assert!(servers[0].online);
    }

    #[tokio::test]
    async fn test_check_server_wire_command() {
        let (_dir, script, capture) = capture_toolkit("[]");
        let toolkit = connect(&script).await;

        toolkit.adb().check_server().await.unwrap();
        assert_eq!(captured_args(&capture), ["adb", "check-server"]);
    }

    #[tokio::test]
    async fn test_check_server_rejects_malformed_json() {
        let (_dir, script) = json_toolkit("definitely not json");
        let toolkit = connect(&script).await;

        let err = toolkit.adb().check_server().await.unwrap_err();
        assert!(matches!(err, ToolkitError::Decode(_)));
    }

    #[tokio::test]
    async fn test_start_server_reuses_check_server_on_the_wire() {
        let (_dir, script, capture) = capture_toolkit("[]");
        let toolkit = connect(&script).await;

        toolkit.adb().start_server().await;
        assert_eq!(captured_args(&capture), ["adb", "check-server"]);
    }

    #[tokio::test]
    async fn test_kill_server_wire_command() {
        let (_dir, script, capture) = capture_toolkit("");
        let toolkit = connect(&script).await;

        toolkit.adb().kill_server().await;
        assert_eq!(captured_args(&capture), ["adb", "kill-server"]);
    }

    #[tokio::test]
    async fn test_detect_adb_decodes_non_ascii_path() {
        let (_dir, script) =
            json_toolkit(r#"{"adb": "/home/пользователь/Android/Sdk/platform-tools/adb"}"#);
        let toolkit = connect(&script).await;

        let location = toolkit.adb().detect_adb().await.unwrap();
        assert_eq!(
            location.adb.to_str().unwrap(),
            "/home/пользователь/Android/Sdk/platform-tools/adb"
        );
    }
}
