//! Configuration for the TiltIO daemon
//!
//! Loads configuration from a TOML file with the minimal parameters the
//! telemetry core needs. Defaults match the WT901 sensor the system was
//! built around.

use crate::error::Result;
use crate::pipeline::WeightingMode;
use crate::store::WindowPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub serial: SerialConfig,
    pub pipeline: PipelineConfig,
    pub calibration: CalibrationConfig,
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Sensor serial port path (e.g., "/dev/ttyUSB0", "COM5")
    pub port: String,
    /// Baud rate (WT901 default: 115200)
    pub baud_rate: u32,
}

/// Window policy names for the sample store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowPolicyName {
    /// Strict ring: oldest sample evicted at capacity
    Scrolling,
    /// Accumulate, then clear once the time span is exceeded
    TimedReset,
}

/// Telemetry pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Milliseconds between successful sample emissions
    pub cadence_ms: u64,
    /// Which eviction policy the sample windows use
    pub window_policy: WindowPolicyName,
    /// Ring capacity for the scrolling policy
    pub window_capacity: usize,
    /// Time span in seconds for the timed-reset policy
    pub window_span_secs: u64,
}

impl PipelineConfig {
    /// Resolve the configured window policy
    pub fn window(&self) -> WindowPolicy {
        match self.window_policy {
            WindowPolicyName::Scrolling => WindowPolicy::Scrolling {
                capacity: self.window_capacity,
            },
            WindowPolicyName::TimedReset => WindowPolicy::TimedReset {
                span: Duration::from_secs(self.window_span_secs),
            },
        }
    }

    /// Resolve the configured cadence
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

/// Axis weighting names for the speed mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightingName {
    /// Only the selected axis contributes
    OneHot,
    /// All axes blended by their recorded range spans
    RangeWeighted,
}

/// Calibration workflow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalibrationConfig {
    /// Seconds before an unclosed session finalizes itself; 0 disables the
    /// timeout (explicit end only)
    pub window_secs: u64,
    /// How per-axis percentages combine into the speed value
    pub weighting: WeightingName,
}

impl CalibrationConfig {
    /// Resolve the configured weighting mode
    pub fn weighting_mode(&self) -> WeightingMode {
        match self.weighting {
            WeightingName::OneHot => WeightingMode::OneHot,
            WeightingName::RangeWeighted => WeightingMode::RangeWeighted,
        }
    }

    /// Resolve the configured session window
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    pub output: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| crate::error::Error::InvalidParameter(e.to_string()))?;
        Ok(config)
    }

    /// Default configuration for a WT901 tilt sensor
    ///
    /// Suitable for testing and development. Production deployments should
    /// use a proper TOML configuration file.
    pub fn wt901_defaults() -> Self {
        Self {
            serial: SerialConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 115200,
            },
            pipeline: PipelineConfig {
                cadence_ms: 50,
                window_policy: WindowPolicyName::Scrolling,
                window_capacity: 100,
                window_span_secs: 30,
            },
            calibration: CalibrationConfig {
                window_secs: 7,
                weighting: WeightingName::OneHot,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
        }
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::error::Error::InvalidParameter(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::wt901_defaults()
    }
}
