//! Test plan execution through the toolkit

use std::ffi::OsStr;
use std::path::Path;

use crate::commands::join_serials;
use crate::error::Result;
use crate::task::RunningTask;
use crate::toolkit::Toolkit;

/// Test plan commands.
pub struct PlanCommands<'a> {
    toolkit: &'a Toolkit,
}

impl<'a> PlanCommands<'a> {
    pub(crate) fn new(toolkit: &'a Toolkit) -> Self {
        Self { toolkit }
    }

    /// Run a test plan on several devices, storing results under
    /// `result_folder`.
    ///
    /// When `report_url` is given it is forwarded to the toolkit, which
    /// streams real-time progress to that endpoint; the reporting channel
    /// itself is entirely the toolkit's business.
    pub fn run(
        &self,
        plan_file: &Path,
        result_folder: &Path,
        devices: &[&str],
        report_url: Option<&str>,
    ) -> Result<RunningTask> {
        let serials = join_serials(devices);
        let mut argv = vec![
            OsStr::new("plan"),
            OsStr::new("run"),
            plan_file.as_os_str(),
            result_folder.as_os_str(),
            OsStr::new(serials.as_str()),
        ];
        if let Some(url) = report_url {
            argv.push(OsStr::new("--report-url"));
            argv.push(OsStr::new(url));
        }
        self.toolkit.spawn(argv)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{capture_toolkit, captured_args};
    use crate::toolkit::Toolkit;
    use std::path::Path;

    async fn connect(path: &std::path::Path) -> Toolkit {
        Toolkit::new(path.to_str().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_run_wire_command() {
        let (_dir, script, capture) = capture_toolkit("");
        let toolkit = connect(&script).await;

        let mut task = toolkit
            .plan()
            .run(
                Path::new("smoke.plan"),
                Path::new("results"),
                &["d1", "d2"],
                None,
            )
            .unwrap();
        task.wait().await.unwrap();

        assert_eq!(
            captured_args(&capture),
            ["plan", "run", "smoke.plan", "results", "d1,d2"]
        );
    }

    #[tokio::test]
    async fn test_run_forwards_report_url() {
        let (_dir, script, capture) = capture_toolkit("");
        let toolkit = connect(&script).await;

        let mut task = toolkit
            .plan()
            .run(
                Path::new("smoke.plan"),
                Path::new("results"),
                &["d1"],
                Some("ws://reports.local/progress"),
            )
            .unwrap();
        task.wait().await.unwrap();

        assert_eq!(
            captured_args(&capture),
            [
                "plan",
                "run",
                "smoke.plan",
                "results",
                "d1",
                "--report-url",
                "ws://reports.local/progress"
            ]
        );
    }
}
