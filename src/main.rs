//! Touch Stick replay tool
//!
//! Feeds a scripted sequence of pointer events into a virtual stick and prints
//! what the stick emits and the resulting controller state.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use touch_stick::controller::{ControllerInputContext, ControllerStateSink, SharedContext};
use touch_stick::replay::ReplayScript;
use touch_stick::stick::{AnalogStick, FnListener, StickEvent};
use touch_stick::AppConfig;

/// Touch Stick - replay pointer gestures through a virtual analog stick
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pointer event script (YAML)
    #[arg(short, long, required_unless_present = "print_config")]
    script: Option<PathBuf>,

    /// Stick configuration file (YAML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print emitted events as JSON lines
    #[arg(long)]
    json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    let config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path.display());
            AppConfig::load(path)?
        },
        None => AppConfig::default(),
    };

    if args.print_config {
        print!("{}", serde_yaml::to_string(&config).context("Failed to serialize config")?);
        return Ok(());
    }

    let script_path = args
        .script
        .ok_or_else(|| anyhow::anyhow!("--script is required"))?;
    let script = ReplayScript::load(&script_path)?;
    info!("Loaded {} pointer events from {}", script.events.len(), script_path.display());

    let stick_config = config.stick_config().context("Invalid stick configuration")?;
    info!(
        "Stick: travel {:.1}, deadzone radius {:.1}, {:?} side",
        stick_config.travel(),
        stick_config.deadzone_radius(),
        config.side
    );

    let context: SharedContext = Arc::new(Mutex::new(ControllerInputContext::default()));
    let mut stick = AnalogStick::new(stick_config);

    let json = args.json;
    stick.add_listener(FnListener::new(move |event: StickEvent| print_event(&event, json)));
    stick.add_listener(ControllerStateSink::new(
        config.side,
        config.separate_l3r3,
        context.clone(),
    ));

    let summary = script.run(&mut stick);
    stick.dispose();

    let state = *context.lock();
    if json {
        println!("{}", serde_json::to_string(&state)?);
    } else {
        println!();
        println!("{}", "=== Replay Summary ===".bold().cyan());
        println!("  Consumed events: {}", summary.consumed.to_string().green());
        println!("  Ignored events:  {}", summary.ignored.to_string().yellow());
        println!("  Left stick:      ({}, {})", state.left_stick_x, state.left_stick_y);
        println!("  Right stick:     ({}, {})", state.right_stick_x, state.right_stick_y);
        println!("  Button flags:    0x{:04X}", state.button_flags);
        println!("  Sends requested: {}", state.revision);
    }

    Ok(())
}

fn print_event(event: &StickEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        StickEvent::Movement { x, y } => {
            println!("{} x: {:>7.4} y: {:>7.4}", "movement".green(), x, y)
        },
        StickEvent::Click => println!("{}", "click".cyan()),
        StickEvent::DoubleClick => println!("{}", "double click".magenta().bold()),
        StickEvent::Revoke => println!("{}", "revoke".yellow()),
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
