//! Derived speed mapping
//!
//! A [`SpeedMapper`] is plain data: one envelope snapshot plus an axis
//! weighting. It is rebuilt wholesale when a calibration session completes
//! and installed by atomic replacement, never mutated in place.

use crate::calibration::CalibrationEnvelope;
use crate::types::{Axis, OrientationSample};

/// How per-axis percentages combine into one speed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisWeighting {
    /// Only the selected axis contributes (weight 1, others 0)
    OneHot(Axis),
    /// Every axis contributes, weighted by its own recorded range span
    RangeWeighted,
}

/// Maps an orientation sample to a 0-100 speed percentage
///
/// Before the first calibration completes the mapper is neutral and
/// evaluates to 0 for every input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedMapper {
    envelope: Option<CalibrationEnvelope>,
    weighting: AxisWeighting,
}

impl SpeedMapper {
    /// Pre-calibration default: every input maps to 0
    pub fn neutral() -> Self {
        Self {
            envelope: None,
            weighting: AxisWeighting::OneHot(Axis::Roll),
        }
    }

    /// Build a mapper from a completed calibration
    pub fn new(envelope: CalibrationEnvelope, weighting: AxisWeighting) -> Self {
        Self {
            envelope: Some(envelope),
            weighting,
        }
    }

    /// True once a calibration envelope has been installed
    pub fn is_calibrated(&self) -> bool {
        self.envelope.is_some()
    }

    /// Evaluate the speed for one sample
    ///
    /// Result is clamped to [0, 100] and rounded to 3 decimal places for
    /// display stability. Degenerate axes (zero recorded span) contribute
    /// nothing; they never produce NaN or infinity.
    pub fn eval(&self, sample: OrientationSample) -> f64 {
        let Some(envelope) = self.envelope else {
            return 0.0;
        };

        let speed = match self.weighting {
            AxisWeighting::OneHot(axis) => envelope.axis(axis).percent(sample.axis(axis)),
            AxisWeighting::RangeWeighted => {
                let mut weighted = 0.0;
                let mut total_span = 0.0;
                for axis in Axis::ALL {
                    let range = envelope.axis(axis);
                    weighted += range.percent(sample.axis(axis)) * range.span();
                    total_span += range.span();
                }
                if total_span == 0.0 {
                    0.0
                } else {
                    weighted / total_span
                }
            }
        };

        (speed.clamp(0.0, 100.0) * 1000.0).round() / 1000.0
    }
}

impl Default for SpeedMapper {
    fn default() -> Self {
        Self::neutral()
    }
}
