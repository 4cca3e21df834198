//! Orientation data types

/// One of the three rotation axes reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Roll,
    Pitch,
    Yaw,
}

impl Axis {
    /// All axes in wire order (roll, pitch, yaw)
    pub const ALL: [Axis; 3] = [Axis::Roll, Axis::Pitch, Axis::Yaw];
}

/// One decoded orientation reading, in degrees
///
/// Each component is in the half-open range (-180, 180]. Immutable once
/// produced by the frame decoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    /// Rotation about the x-axis (degrees)
    pub roll: f64,
    /// Rotation about the y-axis (degrees)
    pub pitch: f64,
    /// Rotation about the z-axis (degrees)
    pub yaw: f64,
}

impl OrientationSample {
    /// Create a new sample
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Zero orientation
    pub fn zero() -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    /// Value for the given axis
    #[inline]
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
        }
    }
}

impl Default for OrientationSample {
    fn default() -> Self {
        Self::zero()
    }
}
