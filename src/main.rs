// LogWarden - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (config.toml, environment, CLI overrides)
// 3. Logging initialisation (debug mode support)
// 4. Detector construction and the scheduled check loop
//
// The loop runs until the process is interrupted (Ctrl+C / SIGTERM).

use clap::Parser;
use logwarden::app::check::Checker;
use logwarden::app::scheduler::{Scheduler, SystemClock};
use logwarden::platform::config::{self, PlatformPaths};
use logwarden::platform::detector::AzureOpenAiDetector;
use logwarden::platform::fs::FileLogSource;
use logwarden::platform::report::StdoutSink;
use logwarden::util;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

/// LogWarden - periodic security review of a web-server access log.
///
/// Every interval, the entries written during the trailing window are sent
/// to an Azure OpenAI deployment and its findings are printed to stdout.
#[derive(Parser, Debug)]
#[command(name = "LogWarden", version, about)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Access log to watch (overrides [source] path).
    #[arg(short = 'l', long = "log-path")]
    log_path: Option<PathBuf>,

    /// Run a single check immediately and exit.
    #[arg(long = "once")]
    once: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());

    // Config is read before logging so [logging] level can take effect;
    // its warnings are replayed once the subscriber is up.
    let (mut app_config, config_warnings) = config::load_config(&config_path);
    config::apply_env(&mut app_config, |key| std::env::var(key).ok());
    if let Some(path) = cli.log_path {
        app_config.log_path = path;
    }

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        config = %config_path.display(),
        log_path = %app_config.log_path.display(),
        window_hours = app_config.window_hours,
        schedule = %app_config.schedule,
        policy = ?app_config.timestamp_policy,
        errors_only = app_config.errors_only,
        "LogWarden starting"
    );

    if let Err(e) = app_config.detector.validate() {
        tracing::error!(error = %e, "Detector is not configured");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let detector = match AzureOpenAiDetector::new(&app_config.detector) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build detector client");
            eprintln!("Error: failed to build detector client: {e}");
            std::process::exit(1);
        }
    };

    let source = FileLogSource::new(&app_config.log_path);
    tracing::info!(path = %source.path().display(), "Watching access log");

    let mut checker = Checker::new(
        app_config.check_settings(),
        source,
        detector,
        StdoutSink::stdout(),
    );

    if cli.once {
        checker.tick();
        return;
    }

    let scheduler = Scheduler::new(&app_config.schedule);
    tracing::info!(
        interval_secs = scheduler.interval().as_secs(),
        schedule = %app_config.schedule,
        "Scheduler configured"
    );
    println!(
        "Checking the last {} hour(s) of {} {}. Stop with Ctrl+C.\n",
        app_config.window_hours,
        app_config.log_path.display(),
        app_config.schedule
    );

    // Never set: the process ends on an external signal.
    let stop = AtomicBool::new(false);
    scheduler.run(&SystemClock, &stop, || checker.tick());
}
