//! Touchscreen trace recording, inspection and replay through the
//! toolkit

use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;

use crate::commands::join_serials;
use crate::error::Result;
use crate::task::RunningTask;
use crate::toolkit::Toolkit;

/// Metadata of a recorded touchscreen event trace.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TraceInfo {
    /// Free-form description given when the trace was recorded.
    pub description: String,
    /// Maximum number of fingers/tools on the screen at once.
    pub contacts: u32,
    /// Pixel width of the recording device screen.
    pub width: u32,
    /// Pixel height of the recording device screen.
    pub height: u32,
    /// Duration of the trace in seconds.
    pub length: f64,
    /// Whether the trace file is valid.
    pub valid: bool,
    /// Number of events recorded in the trace.
    pub records: u64,
}

/// Touchscreen trace commands.
pub struct TraceCommands<'a> {
    toolkit: &'a Toolkit,
}

impl<'a> TraceCommands<'a> {
    pub(crate) fn new(toolkit: &'a Toolkit) -> Self {
        Self { toolkit }
    }

    /// Read the metadata of a trace file.
    ///
    /// Returns `None` without invoking the toolkit when `trace_file`
    /// does not exist on the local filesystem.
    pub async fn get_info(&self, trace_file: &Path) -> Result<Option<TraceInfo>> {
        if !trace_file.is_file() {
            return Ok(None);
        }
        let raw = self
            .toolkit
            .check_output([
                OsStr::new("trace"),
                OsStr::new("info"),
                trace_file.as_os_str(),
            ])
            .await?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Start recording a trace from `device` into `trace_file`.
    pub fn record(&self, trace_file: &Path, device: &str) -> Result<RunningTask> {
        self.toolkit.spawn([
            OsStr::new("trace"),
            OsStr::new("record"),
            trace_file.as_os_str(),
            OsStr::new("-d"),
            OsStr::new(device),
        ])
    }

    /// Start replaying a trace to several devices at once.
    pub fn replay(&self, trace_file: &Path, devices: &[&str]) -> Result<RunningTask> {
        let serials = join_serials(devices);
        self.toolkit.spawn([
            OsStr::new("trace"),
            OsStr::new("replay"),
            trace_file.as_os_str(),
            OsStr::new(serials.as_str()),
        ])
    }
}
