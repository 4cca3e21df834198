//! TiltIO - orientation telemetry daemon
//!
//! Reads a WT901-family tilt sensor over serial and logs decoded samples
//! and the derived speed. Display front-ends embed the library instead of
//! running this binary.

use std::env;
use tilt_io::app::TiltApp;
use tilt_io::config::AppConfig;
use tilt_io::error::Result;
use tilt_io::pipeline::TelemetrySink;
use tilt_io::types::OrientationSample;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `tilt-io <path>` (positional)
/// - `tilt-io --config <path>` (flag-based)
/// - `tilt-io -c <path>` (short flag)
///
/// Defaults to `/etc/tiltio.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/tiltio.toml".to_string()
}

/// Sink that logs what a GUI would render
struct LogSink {
    last_speed: f64,
}

impl TelemetrySink for LogSink {
    fn on_sample(&mut self, sample: OrientationSample) {
        log::debug!(
            "roll={:+8.3}° pitch={:+8.3}° yaw={:+8.3}°",
            sample.roll,
            sample.pitch,
            sample.yaw
        );
    }

    fn on_speed(&mut self, speed: f64) {
        if speed != self.last_speed {
            log::debug!("speed={:.3}%", speed);
            self.last_speed = speed;
        }
    }

    fn on_status(&mut self, message: &str) {
        log::info!("System Info: {}", message);
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("TiltIO v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = parse_config_path();

    // Load configuration, falling back to WT901 defaults when no file exists
    let config = if std::path::Path::new(&config_path).exists() {
        log::info!("Using config: {}", config_path);
        AppConfig::from_file(&config_path)?
    } else {
        log::warn!("Config {} not found, using WT901 defaults", config_path);
        AppConfig::wt901_defaults()
    };

    let sink = Box::new(LogSink { last_speed: 0.0 });
    let mut app = TiltApp::new(config, sink)?;
    app.run()?;

    log::info!("TiltIO stopped");
    Ok(())
}
