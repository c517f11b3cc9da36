//! SetuBridge - sensor-to-ROS bridge daemon
//!
//! Reads frames from a frame source, throttles them to the configured
//! rate and publishes depth, confidence, color, camera-info, pose and
//! odometry topics to a rosbridge-compatible broker over TCP.
//!
//! The shipped binary runs against the synthetic frame source; a real
//! deployment links the library and feeds frames from the capture stack.

use setu_bridge::config::AppConfig;
use setu_bridge::error::{Error, Result};
use setu_bridge::frame::FrameSource;
use setu_bridge::orchestrator::Orchestrator;
use setu_bridge::source::SyntheticFrameSource;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `setu-bridge <path>` (positional)
/// - `setu-bridge --config <path>` (flag-based)
/// - `setu-bridge -c <path>` (short flag)
///
/// Defaults to `/etc/setu-bridge.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "/etc/setu-bridge.toml".to_string()
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config_found = Path::new(&config_path).exists();
    let config = if config_found {
        AppConfig::from_file(&config_path)?
    } else {
        AppConfig::arkit_defaults()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    log::info!("SetuBridge starting...");
    if config_found {
        log::info!("Using config: {}", config_path);
    } else {
        log::warn!("Config {} not found, using defaults", config_path);
    }
    log::info!(
        "Broker {}:{}, target {} Hz",
        config.bridge.host,
        config.bridge.port,
        config.publish.target_fps()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut orchestrator = Orchestrator::new(&config)?;
    orchestrator.connect()?;

    // Synthetic source ticks at its own 30 Hz cadence; the orchestrator
    // throttles down to the configured rate
    let mut source = SyntheticFrameSource::new();
    let frame_interval = Duration::from_secs_f64(1.0 / 30.0);

    while running.load(Ordering::Relaxed) {
        let Some(frame) = source.next_frame() else {
            break;
        };
        orchestrator.update_angular_rate(source.angular_rate());
        orchestrator.process_frame(&frame)?;
        thread::sleep(frame_interval);
    }

    log::info!("SetuBridge shutting down");
    Ok(())
}
