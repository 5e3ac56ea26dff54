//! Toolkit CLI - command-line front end for the device-testing toolkit
//!
//! Usage:
//!     toolkit [--toolkit <command>] <group> <command> [args]
//!
//! Environment Variables:
//!     TOOLKIT_BIN: command used to invoke the toolkit binary
//!                  (default: devtoolkit; may be a sequence such as
//!                  "python toolkit.py")
//!     RUST_LOG: log filter for subprocess tracing (e.g. debug)

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::PathBuf;
use toolkit_client::{ControlCommand, RunningTask, Toolkit};
use tracing_subscriber::EnvFilter;

/// Drive the device-testing toolkit: devices, traces and test plans
#[derive(Parser, Debug)]
#[command(name = "toolkit")]
#[command(about = "Drive the device-testing toolkit: devices, traces and test plans")]
#[command(after_help = r#"Examples:
    # List connected devices
    toolkit devices list

    # Record a touchscreen trace until Enter is pressed
    toolkit trace record login.trace --device emulator-5554

    # Replay it on two devices at once
    toolkit trace replay login.trace emulator-5554 emulator-5556

    # Run a shell command on several devices
    toolkit devices control -d emulator-5554 -d emulator-5556 shell "getprop ro.product.model"

    # Run a test plan with live progress reporting
    toolkit plan run smoke.plan results emulator-5554 --report-url ws://ci.local/progress

    # Use a toolkit started through an interpreter
    toolkit --toolkit "python toolkit.py" devices list
"#)]
struct Cli {
    /// Command used to invoke the toolkit binary. Split on whitespace,
    /// so an interpreter + script sequence works too.
    #[arg(long, env = "TOOLKIT_BIN", default_value = "devtoolkit")]
    toolkit: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Manage the local ADB server
    #[command(subcommand)]
    Adb(AdbCmd),
    /// Discover and control devices
    #[command(subcommand)]
    Devices(DevicesCmd),
    /// Record, inspect and replay touchscreen traces
    #[command(subcommand)]
    Trace(TraceCmd),
    /// Run test plans
    #[command(subcommand)]
    Plan(PlanCmd),
}

#[derive(Subcommand, Debug)]
enum AdbCmd {
    /// Check the state of the local ADB server
    CheckServer,
    /// Start the local ADB server
    StartServer,
    /// Kill the local ADB server
    KillServer,
    /// Locate the adb executable of the installed Android SDK
    Detect,
}

#[derive(Subcommand, Debug)]
enum DevicesCmd {
    /// List connected devices and their properties
    List,
    /// Mirror touchscreen input from a master device to slaves
    Mirror {
        /// Serial number of the master device
        master: String,
        /// Serial numbers of the slave devices
        #[arg(required = true)]
        slaves: Vec<String>,
    },
    /// Run a control command on several devices
    Control {
        /// Target device serial numbers
        #[arg(short = 'd', long = "device", required = true)]
        devices: Vec<String>,
        /// Control command (reboot, shell, install, uninstall,
        /// force_stop, launch_pkg, launch, launch_service,
        /// stop_service, kill_all)
        command: ControlCommand,
        /// Trailing arguments the chosen command expects
        args: Vec<String>,
    },
    /// Capture a device screen to a local JPG
    Screenshot {
        /// Where to save the screenshot
        save_to: PathBuf,
        /// Serial number of the target device
        #[arg(short = 'd', long)]
        device: String,
    },
}

#[derive(Subcommand, Debug)]
enum TraceCmd {
    /// Show the metadata of a trace file
    Info {
        /// Path to the trace file
        trace_file: PathBuf,
    },
    /// Record a trace from a device until Enter is pressed
    Record {
        /// Path of the trace file to write
        trace_file: PathBuf,
        /// Serial number of the device to record from
        #[arg(short = 'd', long)]
        device: String,
    },
    /// Replay a trace to several devices until it finishes
    Replay {
        /// Path to the trace file
        trace_file: PathBuf,
        /// Serial numbers of the target devices
        #[arg(required = true)]
        devices: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum PlanCmd {
    /// Run a test plan across devices
    Run {
        /// Path to the plan file
        plan_file: PathBuf,
        /// Folder to store test results in
        result_folder: PathBuf,
        /// Serial numbers of the test devices
        #[arg(required = true)]
        devices: Vec<String>,
        /// Endpoint for real-time progress reporting
        #[arg(long)]
        report_url: Option<String>,
    },
}

/// Build a client from the configured toolkit command.
async fn connect(toolkit_cmd: &str) -> Result<Toolkit> {
    let parts: Vec<String> = toolkit_cmd.split_whitespace().map(str::to_string).collect();

    if parts.len() == 1 {
        // Resolve through PATH up front for a clearer error than a
        // failed spawn.
        let resolved = which::which(&parts[0])
            .map_err(|_| anyhow!("toolkit binary '{}' not found in PATH", parts[0]))?;
        let toolkit = Toolkit::new(resolved.to_string_lossy())
            .await
            .context("toolkit handshake failed")?;
        Ok(toolkit)
    } else {
        let toolkit = Toolkit::with_command(parts)
            .await
            .context("toolkit handshake failed")?;
        Ok(toolkit)
    }
}

/// Let a long-running task run until the user presses Enter, then stop
/// it gracefully.
async fn run_until_enter(mut task: RunningTask, what: &str) -> Result<()> {
    println!("{} running. Press Enter to stop.", what);

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let status = task.stop().await?;
    if status.success() {
        println!("\u{2713} {} finished", what);
    } else {
        println!("\u{2717} {} exited with {}", what, status);
    }
    Ok(())
}

async fn handle_adb(toolkit: &Toolkit, cmd: AdbCmd) -> Result<()> {
    match cmd {
        AdbCmd::CheckServer => {
            for server in toolkit.adb().check_server().await? {
                let mark = if server.online {
                    "\u{2713}"
                } else {
                    "\u{2717}"
                };
                println!(
                    "  {} {}:{} (adb version {})",
                    mark, server.host, server.port, server.version
                );
            }
        }
        AdbCmd::StartServer => {
            toolkit.adb().start_server().await;
            println!("ADB server start requested.");
        }
        AdbCmd::KillServer => {
            toolkit.adb().kill_server().await;
            println!("ADB server kill requested.");
        }
        AdbCmd::Detect => {
            let location = toolkit.adb().detect_adb().await?;
            println!("{}", location.adb.display());
        }
    }
    Ok(())
}

async fn handle_devices(toolkit: &Toolkit, cmd: DevicesCmd) -> Result<()> {
    match cmd {
        DevicesCmd::List => {
            let devices = toolkit.devices().list().await?;
            if devices.is_empty() {
                println!("No devices connected.");
                return Ok(());
            }
            println!("Connected devices:");
            println!("{}", "-".repeat(60));
            for device in devices {
                println!(
                    "  {:<24} {} (Android {}, {}x{})",
                    device.serialno,
                    device.model,
                    device.os,
                    device.screenwidth,
                    device.screenheight
                );
            }
        }
        DevicesCmd::Mirror { master, slaves } => {
            let slave_refs: Vec<&str> = slaves.iter().map(String::as_str).collect();
            let task = toolkit.devices().mirror(&master, &slave_refs)?;
            run_until_enter(task, "Mirroring").await?;
        }
        DevicesCmd::Control {
            devices,
            command,
            args,
        } => {
            let device_refs: Vec<&str> = devices.iter().map(String::as_str).collect();
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let output = toolkit
                .devices()
                .control(&device_refs, command, &arg_refs)
                .await?;
            print!("{}", output);
        }
        DevicesCmd::Screenshot { save_to, device } => {
            toolkit.devices().screenshot(&save_to, &device).await;
            println!("Screenshot requested: {}", save_to.display());
        }
    }
    Ok(())
}

async fn handle_trace(toolkit: &Toolkit, cmd: TraceCmd) -> Result<()> {
    match cmd {
        TraceCmd::Info { trace_file } => match toolkit.trace().get_info(&trace_file).await? {
            Some(info) => {
                let mark = if info.valid { "\u{2713}" } else { "\u{2717}" };
                println!("{} {}", mark, trace_file.display());
                if !info.description.is_empty() {
                    println!("  description: {}", info.description);
                }
                println!("  screen:      {}x{}", info.width, info.height);
                println!("  contacts:    {}", info.contacts);
                println!("  records:     {}", info.records);
                println!("  length:      {:.1}s", info.length);
            }
            None => println!("No such trace file: {}", trace_file.display()),
        },
        TraceCmd::Record { trace_file, device } => {
            let task = toolkit.trace().record(&trace_file, &device)?;
            run_until_enter(task, "Recording").await?;
        }
        TraceCmd::Replay {
            trace_file,
            devices,
        } => {
            let device_refs: Vec<&str> = devices.iter().map(String::as_str).collect();
            let mut task = toolkit.trace().replay(&trace_file, &device_refs)?;
            println!("Replaying {} ...", trace_file.display());
            let status = task.wait().await?;
            if status.success() {
                println!("\u{2713} Replay finished");
            } else {
                println!("\u{2717} Replay exited with {}", status);
            }
        }
    }
    Ok(())
}

async fn handle_plan(toolkit: &Toolkit, cmd: PlanCmd) -> Result<()> {
    match cmd {
        PlanCmd::Run {
            plan_file,
            result_folder,
            devices,
            report_url,
        } => {
            let device_refs: Vec<&str> = devices.iter().map(String::as_str).collect();
            let mut task = toolkit.plan().run(
                &plan_file,
                &result_folder,
                &device_refs,
                report_url.as_deref(),
            )?;
            println!(
                "Running {} on {} device(s), results in {} ...",
                plan_file.display(),
                device_refs.len(),
                result_folder.display()
            );
            let status = task.wait().await?;
            if status.success() {
                println!("\u{2713} Plan finished");
            } else {
                println!("\u{2717} Plan exited with {}", status);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    let toolkit = connect(&args.toolkit).await?;

    match args.command {
        CliCommand::Adb(cmd) => handle_adb(&toolkit, cmd).await,
        CliCommand::Devices(cmd) => handle_devices(&toolkit, cmd).await,
        CliCommand::Trace(cmd) => handle_trace(&toolkit, cmd).await,
        CliCommand::Plan(cmd) => handle_plan(&toolkit, cmd).await,
    }
}
