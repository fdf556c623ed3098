//! Posture telemetry daemon: samples posture on a schedule and reports it.

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use posture_telemetry::{
    app::PostureApp,
    config::{Config, Overrides, EXAMPLE_CONFIG},
    scheduler::SystemClock,
    Error,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Telemetry authentication token
    #[arg(long, env = "POSTURE_TELEMETRY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Telemetry endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Minutes between samples
    #[arg(long)]
    interval: Option<u64>,

    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Path to the pose landmark ONNX model
    #[arg(long)]
    model: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Posture Telemetry");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    Overrides {
        token: args.token,
        endpoint: args.endpoint,
        interval_minutes: args.interval,
        camera_index: args.cam,
        model_path: args.model,
    }
    .apply(&mut config);

    let mut app = match PostureApp::new(config) {
        Ok(app) => app,
        Err(e @ Error::ConfigError(_)) => {
            error!("{}", e);
            eprintln!("{e}\nSet the telemetry token before starting the program.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    if args.once {
        if let Some(Err(failure)) = app.run_cycles(SystemClock::new(), 1) {
            return Err(failure.into());
        }
    } else {
        app.run();
    }

    Ok(())
}
