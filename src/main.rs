//! Scroll Tracker CLI
//!
//! Run with no arguments to track; press Ctrl+C to stop and save.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scroll_tracker::{
    collector::{check_permission, Collector, PERMISSION_HINT},
    config::Config,
    dashboard::format_duration,
    store::StatsStore,
    tracker::{Tracker, CLEAR_SCREEN},
    VERSION,
};
use std::io;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scroll-tracker")]
#[command(version = VERSION)]
#[command(about = "Track your scroll wheel with session and all-time statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored all-time statistics without tracking
    Stats,

    /// Show the effective configuration
    Config,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None => cmd_track(),
        Some(Commands::Stats) => cmd_stats(),
        Some(Commands::Config) => cmd_config(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so they do not interleave with the dashboard.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!(
            "Ignoring config file {}: {e}",
            Config::config_path().display()
        );
        Config::default()
    })
}

fn cmd_track() -> Result<()> {
    let config = load_config();
    let store = StatsStore::new(config.data_file_path());
    let record = store.load();

    if !check_permission() {
        eprintln!("{PERMISSION_HINT}");
        eprintln!();
        bail!("cannot observe global scroll events");
    }

    let mut collector = Collector::new();
    let tracker = Tracker::new(
        store,
        record,
        collector.receiver().clone(),
        config.refresh_interval,
    );

    let running = tracker.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    collector
        .start()
        .context("Could not start scroll capture")?;

    println!("  Scroll Wheel Tracker is running... (Ctrl+C to stop)");
    println!();

    let rendered = tracker.run_dashboard(&mut io::stdout().lock());
    tracker.stop();
    collector.stop();
    if let Err(e) = rendered {
        tracing::error!("Dashboard stopped early: {e}");
    }

    let report = tracker.finish().context("Could not save session")?;

    print!("{CLEAR_SCREEN}");
    println!("{}", report.summary());
    Ok(())
}

fn cmd_stats() -> Result<()> {
    let config = load_config();
    let store = StatsStore::new(config.data_file_path());

    println!("Scroll Tracker Statistics");
    println!("=========================");
    println!();

    let Some(record) = store.try_load()? else {
        println!("No sessions recorded yet at {}.", store.path().display());
        println!("Run 'scroll-tracker' to start tracking.");
        return Ok(());
    };

    println!("  Scroll Up    : {}", record.total_scroll_up);
    println!("  Scroll Down  : {}", record.total_scroll_down);
    println!("  Total Clicks : {}", record.total_clicks);
    println!("  Sessions     : {}", record.total_sessions);
    println!(
        "  Total Time   : {}",
        format_duration(record.total_time_seconds)
    );
    let show = |ts: Option<chrono::DateTime<chrono::Local>>| {
        ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string())
    };
    println!("  First Session: {}", show(record.first_session));
    println!("  Last Session : {}", show(record.last_session));
    println!();
    println!("Data file: {}", store.path().display());
    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load().context("Could not read config file")?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", Config::config_path().display());
    println!("Data file:   {}", config.data_file_path().display());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
