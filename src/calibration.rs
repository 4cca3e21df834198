//! Calibration envelope recording and the reset offset controller
//!
//! While a calibration session is open, every sample from the telemetry
//! reader lands in a [`CalibrationRecorder`] kept separate from the display
//! store. Ending the session collapses the recording into a
//! [`CalibrationEnvelope`] (per-axis min/max), which the speed mapper is
//! built from. The session state machine itself lives in
//! [`crate::pipeline::Pipeline`].

use crate::types::{Axis, OrientationSample};

/// Recorded min/max for one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Span of the range; zero for a degenerate (single-value) range
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the range as a percentage
    ///
    /// A degenerate range contributes 0 rather than dividing by zero.
    pub fn percent(&self, value: f64) -> f64 {
        let span = self.span();
        if span == 0.0 {
            return 0.0;
        }
        (value - self.min) / span * 100.0
    }

    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Per-axis min/max envelope over one calibration window
///
/// Invariant: `max >= min` on every axis, since both come from the same
/// observed samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationEnvelope {
    pub roll: AxisRange,
    pub pitch: AxisRange,
    pub yaw: AxisRange,
}

impl CalibrationEnvelope {
    /// Range for the given axis
    pub fn axis(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
        }
    }
}

/// Accumulates samples during a calibration session
#[derive(Debug, Clone, Default)]
pub struct CalibrationRecorder {
    samples: Vec<OrientationSample>,
}

impl CalibrationRecorder {
    /// Start a recording seeded with the current reading
    ///
    /// Seeding guarantees a non-empty envelope even if the session ends
    /// immediately; a single-sample envelope is degenerate on every axis and
    /// maps to zero speed.
    pub fn start(seed: OrientationSample) -> Self {
        Self {
            samples: vec![seed],
        }
    }

    /// Append one observed sample
    pub fn record(&mut self, sample: OrientationSample) {
        self.samples.push(sample);
    }

    /// Number of recorded samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Collapse the recording into a min/max envelope
    pub fn envelope(&self) -> Option<CalibrationEnvelope> {
        let first = self.samples.first()?;
        let mut envelope = CalibrationEnvelope {
            roll: AxisRange {
                min: first.roll,
                max: first.roll,
            },
            pitch: AxisRange {
                min: first.pitch,
                max: first.pitch,
            },
            yaw: AxisRange {
                min: first.yaw,
                max: first.yaw,
            },
        };
        for s in &self.samples[1..] {
            envelope.roll.observe(s.roll);
            envelope.pitch.observe(s.pitch);
            envelope.yaw.observe(s.yaw);
        }
        Some(envelope)
    }
}

/// Cumulative per-axis offsets applied before samples reach the store
///
/// `reset()` on the pipeline captures the latest displayed reading and adds
/// it here, so everything after the reset is shown relative to the
/// orientation at reset time. Repeated resets compound.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisOffsets {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl AxisOffsets {
    /// Subtract the offsets from a raw sample
    pub fn apply(&self, sample: OrientationSample) -> OrientationSample {
        OrientationSample::new(
            sample.roll - self.roll,
            sample.pitch - self.pitch,
            sample.yaw - self.yaw,
        )
    }

    /// Fold a captured reading into the running offsets
    pub fn accumulate(&mut self, reading: OrientationSample) {
        self.roll += reading.roll;
        self.pitch += reading.pitch;
        self.yaw += reading.yaw;
    }
}
