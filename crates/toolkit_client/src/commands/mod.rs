//! Command groups exposed by the toolkit client
//!
//! This module provides one façade per toolkit subcommand family:
//! - `adb`: ADB server management
//! - `devices`: device discovery, control, mirroring and screenshots
//! - `trace`: touchscreen trace recording, inspection and replay
//! - `plan`: multi-device test plan runs
//!
//! Each façade encodes one toolkit subcommand per method and decodes the
//! JSON (or raw text) the toolkit prints.

mod adb;
mod devices;
mod plan;
mod trace;

pub use adb::{AdbCommands, AdbLocation, ServerState};
pub use devices::{ControlCommand, DeviceCommands, DeviceDescriptor};
pub use plan::PlanCommands;
pub use trace::{TraceCommands, TraceInfo};

/// Join device serials into the toolkit's comma-separated wire form.
/// Order is preserved; a single serial carries no delimiter.
pub(crate) fn join_serials(devices: &[&str]) -> String {
    devices.join(",")
}
