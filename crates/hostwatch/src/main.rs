//! hostwatch - live host metrics with a bounded in-memory history.
//!
//! Samples CPU, memory, disk, network and the process list on a fixed
//! cadence and shows them in a terminal UI, or logs them when headless.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

#[cfg(target_os = "linux")]
use hostwatch_core::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use hostwatch_core::collector::mock::MockFs;
use hostwatch_core::collector::{Probe, ProcfsProbe};
use hostwatch_core::fmt::{format_mb, format_percent};
use hostwatch_core::publisher::{SamplerEvent, SnapshotPublisher, Subscription};
use hostwatch_core::sampler::{InvalidConfig, SamplerConfig, SamplerHandle, SamplerLoop};
use hostwatch_core::storage::MetricsSnapshot;

/// How often the TUI redraws when nothing happens.
const TUI_REDRAW: Duration = Duration::from_millis(250);

/// Live host metrics monitor.
#[derive(Parser, Debug)]
#[command(name = "hostwatch", about = "Live host metrics monitor", version)]
struct Args {
    /// Sampling interval in seconds.
    #[arg(
        short,
        long,
        env = "HOSTWATCH_INTERVAL",
        default_value_t = 2,
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    interval: u32,

    /// Points kept per metric window.
    #[arg(long, env = "HOSTWATCH_HISTORY", default_value_t = 100)]
    history: usize,

    /// Upper bound on a single probe call, in milliseconds.
    #[arg(long, env = "HOSTWATCH_PROBE_TIMEOUT", default_value_t = 5000)]
    probe_timeout: u32,

    /// Path to /proc filesystem.
    #[arg(long, env = "HOSTWATCH_PROC_PATH", default_value = "/proc")]
    proc_path: String,

    /// Mount point whose usage is reported as disk usage.
    #[arg(long, env = "HOSTWATCH_DISK_PATH", default_value = "/")]
    disk_path: String,

    /// Window the first CPU reading is averaged over, in milliseconds.
    #[arg(long, env = "HOSTWATCH_CPU_WINDOW", default_value_t = 1000)]
    cpu_window: u64,

    /// Run without the terminal UI and log every sample.
    #[arg(long, env = "HOSTWATCH_HEADLESS")]
    headless: bool,

    /// Headless output format.
    #[arg(long, value_enum, env = "HOSTWATCH_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Write logs to this file. In TUI mode logs are discarded otherwise.
    #[arg(long, env = "HOSTWATCH_LOG_FILE", value_name = "PATH")]
    log_file: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// One summary log line per sample.
    Text,
    /// One JSON document per event on stdout.
    Json,
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_filter(level: Level) -> Result<EnvFilter, ParseError> {
    let mut filter = EnvFilter::from_default_env();
    for target in ["hostwatch", "hostwatch_core"] {
        filter = filter.add_directive(format!("{}={}", target, level).parse()?);
    }
    Ok(filter)
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the tracing subscriber.
///
/// Logs go to `--log-file` when given; otherwise to stderr when headless and
/// nowhere in TUI mode, where they would corrupt the screen.
fn init_logging(args: &Args) -> Result<(), String> {
    let filter = build_filter(log_level(args.verbose, args.quiet))
        .map_err(|e| format!("invalid log filter: {}", e))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match &args.log_file {
        Some(path) => {
            let file = open_log_file(Path::new(path))
                .map_err(|e| format!("cannot open log file {}: {}", path, e))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None if args.headless => builder.with_target(false).with_writer(io::stderr).try_init(),
        None => builder.with_writer(io::sink).try_init(),
    };
    result.map_err(|e| format!("cannot install logger: {}", e))
}

fn sampler_config(args: &Args) -> Result<SamplerConfig, InvalidConfig> {
    SamplerConfig::new(args.interval.saturating_mul(1000))?
        .with_capacity(args.history)?
        .with_probe_timeout(args.probe_timeout)
}

fn build_probe(args: &Args) -> Box<dyn Probe> {
    let cpu_window = Duration::from_millis(args.cpu_window);

    #[cfg(target_os = "linux")]
    let probe = ProcfsProbe::new(RealFs::new(), args.proc_path.as_str())
        .with_disk_path(args.disk_path.as_str())
        .with_cpu_window(cpu_window);

    #[cfg(not(target_os = "linux"))]
    let probe = {
        warn!("no /proc on this platform, sampling a simulated host");
        ProcfsProbe::new(MockFs::typical_system(), "/proc").with_cpu_window(cpu_window)
    };

    Box::new(probe)
}

/// One-line summary of a snapshot for logging.
fn describe_snapshot(snapshot: &MetricsSnapshot) -> String {
    match &snapshot.sample {
        Some(s) => format!(
            "cpu {}, mem {}, disk {}, sent {}, recv {}, {} processes",
            format_percent(s.cpu_percent),
            format_percent(s.mem_percent),
            format_percent(s.disk_percent),
            format_mb(s.net_bytes_sent),
            format_mb(s.net_bytes_recv),
            s.processes.len()
        ),
        None => "no sample yet".to_string(),
    }
}

/// JSON document for a sampler event.
fn event_json(event: &SamplerEvent) -> serde_json::Value {
    match event {
        SamplerEvent::Snapshot(snap) => json!({
            "event": "snapshot",
            "snapshot": &**snap,
        }),
        SamplerEvent::SampleFailed { tick, cause } => json!({
            "event": "sample_failed",
            "tick": tick,
            "cause": cause.reason(),
        }),
        SamplerEvent::ProbeDegraded {
            consecutive_failures,
            last_cause,
        } => json!({
            "event": "probe_degraded",
            "consecutive_failures": consecutive_failures,
            "last_cause": last_cause.reason(),
        }),
    }
}

fn emit(event: &SamplerEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", event_json(event)),
        OutputFormat::Text => {
            // Failures are already logged by the sampler.
            if let SamplerEvent::Snapshot(snap) = event {
                info!("Snapshot #{}: {}", snap.sequence, describe_snapshot(snap));
            }
        }
    }
}

fn run_headless(
    runtime: &tokio::runtime::Runtime,
    handle: SamplerHandle,
    mut events: Subscription,
    format: OutputFormat,
) {
    let stopper = handle.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        stopper.stop();
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    runtime.block_on(async {
        while let Some(event) = events.recv().await {
            emit(&event, format);
        }
        handle.shutdown().await;
    });
}

fn run(args: Args) -> Result<(), String> {
    init_logging(&args)?;
    let config = sampler_config(&args).map_err(|e| format!("invalid configuration: {}", e))?;

    info!("hostwatch {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, history={}, proc={}, disk={}",
        args.interval, args.history, args.proc_path, args.disk_path
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build tokio runtime: {}", e))?;
    let _guard = runtime.enter();

    // Subscribe before the first tick so headless output starts with it.
    let publisher = SnapshotPublisher::new();
    let events = publisher.subscribe();
    let handle = SamplerLoop::new(build_probe(&args), config)
        .with_publisher(publisher)
        .start()
        .map_err(|e| format!("invalid configuration: {}", e))?;

    if args.headless {
        run_headless(&runtime, handle, events, args.format);
        return Ok(());
    }

    drop(events);
    let result = hostwatch_core::tui::App::new(handle.clone()).run(TUI_REDRAW);
    runtime.block_on(handle.shutdown());
    result.map_err(|e| format!("terminal error: {}", e))
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hostwatch: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::collector::ProbeError;
    use hostwatch_core::storage::{HostSample, ProcessInfo};
    use std::io::{Read, Write};
    use std::sync::Arc;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("hostwatch").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_documented_values() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.interval, 2);
        assert_eq!(args.history, 100);
        assert_eq!(args.proc_path, "/proc");
        assert_eq!(args.disk_path, "/");
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.headless);

        let config = sampler_config(&args).unwrap();
        assert_eq!(config.interval_ms, 2_000);
        assert_eq!(config.capacity, 100);
        assert_eq!(config.probe_timeout_ms, 5_000);
    }

    #[test]
    fn interval_is_bounded_to_a_minute() {
        assert!(parse(&["--interval", "0"]).is_err());
        assert!(parse(&["--interval", "61"]).is_err());
        let args = parse(&["-i", "60", "--headless", "--format", "json"]).unwrap();
        assert_eq!(sampler_config(&args).unwrap().interval_ms, 60_000);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn zero_history_is_rejected() {
        let args = parse(&["--history", "0"]).unwrap();
        assert_eq!(sampler_config(&args), Err(InvalidConfig::ZeroCapacity));
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(log_level(0, false), Level::INFO);
        assert_eq!(log_level(1, false), Level::DEBUG);
        assert_eq!(log_level(3, false), Level::TRACE);
        assert_eq!(log_level(2, true), Level::ERROR);
        assert!(build_filter(Level::DEBUG).is_ok());
    }

    #[test]
    fn log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostwatch.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn describes_snapshot() {
        let snap = MetricsSnapshot {
            sequence: 4,
            sample: Some(HostSample {
                cpu_percent: 12.5,
                mem_percent: 25.0,
                disk_percent: 50.0,
                net_bytes_sent: 10_485_760,
                net_bytes_recv: 52_428_800,
                processes: vec![ProcessInfo::new(1, "init", 0)],
                taken_at: 0,
            }),
            ..Default::default()
        };
        assert_eq!(
            describe_snapshot(&snap),
            "cpu 12.5%, mem 25.0%, disk 50.0%, sent 10.00 MB, recv 50.00 MB, 1 processes"
        );
        assert_eq!(describe_snapshot(&MetricsSnapshot::unstarted()), "no sample yet");
    }

    #[test]
    fn events_serialize_to_json() {
        let snap = Arc::new(MetricsSnapshot {
            sequence: 2,
            cpu: vec![1.0, 2.0],
            ..Default::default()
        });
        let value = event_json(&SamplerEvent::Snapshot(snap));
        assert_eq!(value["event"], "snapshot");
        assert_eq!(value["snapshot"]["sequence"], 2);
        assert_eq!(value["snapshot"]["cpu"][1], 2.0);

        let value = event_json(&SamplerEvent::ProbeDegraded {
            consecutive_failures: 3,
            last_cause: ProbeError::Busy,
        });
        assert_eq!(value["event"], "probe_degraded");
        assert_eq!(value["consecutive_failures"], 3);
        assert_eq!(value["last_cause"], "previous probe call still running");
    }
}
