//! Device discovery and control through the toolkit

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::commands::join_serials;
use crate::error::Result;
use crate::task::RunningTask;
use crate::toolkit::Toolkit;

/// One discovered device, as reported by `devices list`.
///
/// Most fields mirror Android system properties; the toolkit reads them
/// via the ADB server, this client only decodes them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceDescriptor {
    /// ADB device serial number.
    pub serialno: String,
    /// Currently the same as the serial number.
    pub uid: String,
    /// Pixel width of the device screen.
    pub screenwidth: u32,
    /// Pixel height of the device screen.
    pub screenheight: u32,
    /// ro.product.model
    pub model: String,
    /// ro.product.name
    pub name: String,
    /// ro.product.device
    pub device: String,
    /// ro.product.brand
    pub brand: String,
    /// ro.product.manufacturer
    pub manufacturer: String,
    /// ro.build.version.release
    pub os: String,
    /// ro.build.version.sdk
    pub sdk: String,
    /// dalvik.vm.heapsize
    pub heapsize: String,
}

/// Operations `devices control` can run on a set of devices.
///
/// The toolkit defines the trailing arguments each command takes; this
/// client forwards whatever the caller supplies without validating the
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Reboot the devices.
    Reboot,
    /// Run a shell command; takes the command string.
    Shell,
    /// Install an apk; takes a local apk path.
    Install,
    /// Uninstall an app; takes a package name.
    Uninstall,
    /// Force-stop an app (not a graceful kill); takes a package name.
    ForceStop,
    /// Launch the default activity of a package; takes a package name.
    LaunchPkg,
    /// Launch an activity; takes a package name and an activity class.
    Launch,
    /// Start a service; takes a package name and a service class.
    LaunchService,
    /// Stop a service; takes a package name and a service class.
    StopService,
    /// Kill all background apps.
    KillAll,
}

impl ControlCommand {
    /// Name of the command on the toolkit command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reboot => "reboot",
            Self::Shell => "shell",
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::ForceStop => "force_stop",
            Self::LaunchPkg => "launch_pkg",
            Self::Launch => "launch",
            Self::LaunchService => "launch_service",
            Self::StopService => "stop_service",
            Self::KillAll => "kill_all",
        }
    }
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "reboot" => Ok(Self::Reboot),
            "shell" => Ok(Self::Shell),
            "install" => Ok(Self::Install),
            "uninstall" => Ok(Self::Uninstall),
            "force_stop" => Ok(Self::ForceStop),
            "launch_pkg" => Ok(Self::LaunchPkg),
            "launch" => Ok(Self::Launch),
            "launch_service" => Ok(Self::LaunchService),
            "stop_service" => Ok(Self::StopService),
            "kill_all" => Ok(Self::KillAll),
            other => Err(format!("unknown control command: {}", other)),
        }
    }
}

/// Device discovery and control commands.
pub struct DeviceCommands<'a> {
    toolkit: &'a Toolkit,
}

impl<'a> DeviceCommands<'a> {
    pub(crate) fn new(toolkit: &'a Toolkit) -> Self {
        Self { toolkit }
    }

    /// List all devices known to the ADB server, with their properties.
    pub async fn list(&self) -> Result<Vec<DeviceDescriptor>> {
        let raw = self.toolkit.check_output(["devices", "list"]).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Mirror touchscreen input from one master device to a set of
    /// slave devices in real time.
    pub fn mirror(&self, master: &str, slaves: &[&str]) -> Result<RunningTask> {
        let slaves = join_serials(slaves);
        self.toolkit
            .spawn(["devices", "mirror", master, slaves.as_str()])
    }

    /// Run one control command on several devices at once.
    ///
    /// Returns the toolkit's raw, command-specific output. Trailing
    /// `args` are forwarded verbatim after the command name; see
    /// [`ControlCommand`] for what each command expects.
    pub async fn control(
        &self,
        devices: &[&str],
        command: ControlCommand,
        args: &[&str],
    ) -> Result<String> {
        let serials = join_serials(devices);
        let mut argv = vec!["devices", "control", serials.as_str(), command.as_str()];
        argv.extend_from_slice(args);
        self.toolkit.check_output(argv).await
    }

    /// Run a shell command on several devices and decode the map of
    /// per-device output the toolkit reports.
    pub async fn shell(
        &self,
        devices: &[&str],
        shell_command: &str,
    ) -> Result<HashMap<String, String>> {
        let raw = self
            .control(devices, ControlCommand::Shell, &[shell_command])
            .await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Capture one device's screen to a local JPG at `save_to`.
    /// Best-effort; failures are not surfaced.
    pub async fn screenshot(&self, save_to: &Path, device: &str) {
        self.toolkit
            .call([
                OsStr::new("devices"),
                OsStr::new("screenshot"),
                save_to.as_os_str(),
                OsStr::new("--device"),
                OsStr::new(device),
            ])
            .await;
    }
}
