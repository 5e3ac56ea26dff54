//! toolkit_client: Rust client for the device-testing toolkit
//!
//! The toolkit binary owns the hard parts — ADB communication, trace
//! recording and replay, input synchronization, test plan execution.
//! This crate drives it as a subprocess and exposes four command groups:
//! - `adb`: ADB server management
//! - `devices`: device discovery, control, mirroring and screenshots
//! - `trace`: touchscreen trace recording, inspection and replay
//! - `plan`: multi-device test plan runs
//!
//! Query commands decode the toolkit's JSON output; long-running
//! commands return a [`RunningTask`] handle for the spawned process.
//!
//! # Example
//!
//! ```no_run
//! use toolkit_client::Toolkit;
//!
//! #[tokio::main]
//! async fn main() -> toolkit_client::Result<()> {
//!     let toolkit = Toolkit::new("devtoolkit").await?;
//!
//!     for device in toolkit.devices().list().await? {
//!         println!("{} ({})", device.serialno, device.model);
//!     }
//!
//!     let mut recording = toolkit
//!         .trace()
//!         .record("login.trace".as_ref(), "emulator-5554")?;
//!     // ... exercise the device ...
//!     recording.stop().await?;
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;
pub mod task;
pub mod toolkit;

// Command groups
pub mod commands;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use commands::{
    AdbCommands, AdbLocation, ControlCommand, DeviceCommands, DeviceDescriptor, PlanCommands,
    ServerState, TraceCommands, TraceInfo,
};
pub use error::{Result, ToolkitError};
pub use task::RunningTask;
pub use toolkit::{Toolkit, COMPAT_LEVEL};
