//! TiltIO - serial orientation telemetry and calibration core
//!
//! Reads fixed-size angle frames from a WT901-family tilt sensor over a
//! serial port, maintains rolling per-channel sample windows for a display
//! layer, and derives a calibrated 0-100 "speed" value from a recorded
//! per-axis min/max envelope.
//!
//! The display layer (plotting, widgets) is not part of this crate; it
//! plugs in through [`pipeline::TelemetrySink`].

pub mod app;
pub mod calibration;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod speed;
pub mod store;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use types::{Axis, OrientationSample};
