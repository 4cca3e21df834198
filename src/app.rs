//! Application orchestration for the TiltIO daemon
//!
//! Opens the sensor port fail-fast, spawns the telemetry reader thread and
//! exposes the control surface the display layer drives.

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, TelemetrySink};
use crate::telemetry;
use crate::transport::SerialTransport;
use crate::types::Axis;
use log::{debug, error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Main application structure that manages all components
pub struct TiltApp {
    config: AppConfig,
    pipeline: Pipeline,
    /// Held until `run` hands it to the reader thread
    transport: Option<SerialTransport>,
    reader: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl TiltApp {
    /// Create a new TiltApp instance
    ///
    /// Opens the serial port immediately; an unreachable device is a fatal
    /// [`Error::Connection`], not a degraded state.
    pub fn new(config: AppConfig, sink: Box<dyn TelemetrySink>) -> Result<Self> {
        info!("Initializing TiltIO application");

        info!(
            "Opening sensor port {} at {} baud",
            config.serial.port, config.serial.baud_rate
        );
        let transport = SerialTransport::open(&config.serial.port, config.serial.baud_rate)?;

        let pipeline = Pipeline::new(
            config.pipeline.window(),
            config.calibration.weighting_mode(),
            config.calibration.window(),
            sink,
        );

        Ok(Self {
            config,
            pipeline,
            transport: Some(transport),
            reader: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Handle to the pipeline for direct control (tests, embedding)
    pub fn pipeline(&self) -> Pipeline {
        self.pipeline.clone()
    }

    /// Start the reader thread and block until shutdown
    pub fn run(&mut self) -> Result<()> {
        self.start_reader()?;
        self.setup_signal_handler();

        info!("TiltIO running. Press Ctrl+C to stop.");

        let mut last_stats = Instant::now();
        while !self.shutdown.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_millis(100));

            if last_stats.elapsed().as_secs() >= 10 {
                self.log_statistics();
                last_stats = Instant::now();
            }
        }

        info!("Shutdown signal received, stopping reader...");
        self.stop();
        Ok(())
    }

    /// Zero the displayed orientation at the current reading
    pub fn reset(&self) {
        self.pipeline.reset();
    }

    /// Open a calibration session
    pub fn start_calibration(&self) {
        self.pipeline.start_calibration();
    }

    /// Explicitly end the open calibration session
    pub fn end_calibration(&self) {
        self.pipeline.end_calibration();
    }

    /// Select which axis a one-hot speed mapper follows
    pub fn select_axis(&self, axis: Axis) {
        self.pipeline.select_axis(axis);
    }

    /// Spawn the telemetry reader thread
    fn start_reader(&mut self) -> Result<()> {
        let transport = self
            .transport
            .take()
            .ok_or_else(|| Error::Other("Reader already started".to_string()))?;
        let pipeline = self.pipeline.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let cadence = self.config.pipeline.cadence();

        let handle = std::thread::Builder::new()
            .name("telemetry-reader".to_string())
            .spawn(move || {
                debug!("Telemetry reader thread started");
                telemetry::reader_loop(transport, pipeline, shutdown, cadence);
            })
            .map_err(|e| Error::Other(format!("Failed to spawn reader: {}", e)))?;

        self.reader = Some(handle);
        info!("✓ Telemetry reader started");
        Ok(())
    }

    /// Setup signal handler for graceful shutdown
    fn setup_signal_handler(&self) {
        let shutdown = Arc::clone(&self.shutdown);

        std::thread::Builder::new()
            .name("signal-handler".to_string())
            .spawn(move || {
                let mut signals =
                    Signals::new([SIGINT, SIGTERM]).expect("Failed to register signal handlers");

                if let Some(sig) = signals.forever().next() {
                    info!("Received signal {:?}, initiating shutdown...", sig);
                    shutdown.store(true, Ordering::Relaxed);
                }
            })
            .expect("Failed to spawn signal handler thread");
    }

    /// Log pipeline statistics
    fn log_statistics(&self) {
        let (samples, speed) = self
            .pipeline
            .with_store(|store| (store.roll.len(), store.speed.latest().unwrap_or(0.0)));
        info!(
            "Telemetry: window={} samples, speed={:.3}%, calibrated={}",
            samples,
            speed,
            self.pipeline.is_calibrated()
        );
    }

    /// Signal the reader to stop and join it
    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                error!("Telemetry reader panicked");
            }
        }
        info!("✓ All threads stopped");
    }
}

impl Drop for TiltApp {
    fn drop(&mut self) {
        debug!("TiltApp cleaning up...");
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}
