//! Rolling sample windows consumed by the display layer
//!
//! Two eviction policies exist because the display uses them differently:
//! a scrolling trace wants a strict ring (oldest point falls off), while a
//! segmented time plot accumulates freely and restarts from a fresh origin
//! once its time span is exceeded.
//!
//! A scrolling window starts pre-filled with zeros so the display trace has
//! a fixed width from the first frame. A timed-reset window drops the
//! sample that crosses the span bound: the clear leaves the window empty
//! and the next push starts the new time origin.

use crate::types::OrientationSample;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Eviction policy for a [`SampleWindow`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowPolicy {
    /// Fixed-capacity FIFO; appending at capacity evicts the oldest value
    Scrolling { capacity: usize },
    /// Unbounded until the elapsed time since the window origin exceeds
    /// `span`, then the window clears and the origin restarts
    TimedReset { span: Duration },
}

/// One channel of rolling numeric samples
#[derive(Debug, Clone)]
pub struct SampleWindow {
    policy: WindowPolicy,
    values: VecDeque<f64>,
    /// Seconds since the window origin, parallel to `values`
    elapsed: VecDeque<f64>,
    origin: Option<Instant>,
}

impl SampleWindow {
    /// Create a window with the given policy
    ///
    /// A scrolling window starts at full capacity, filled with zeros.
    pub fn new(policy: WindowPolicy) -> Self {
        let (values, elapsed) = match policy {
            WindowPolicy::Scrolling { capacity } => (
                VecDeque::from(vec![0.0; capacity]),
                VecDeque::from(vec![0.0; capacity]),
            ),
            WindowPolicy::TimedReset { .. } => {
                (VecDeque::with_capacity(256), VecDeque::with_capacity(256))
            }
        };
        Self {
            policy,
            values,
            elapsed,
            origin: None,
        }
    }

    /// Append one value observed at `now`
    ///
    /// Under `TimedReset`, a push past the span bound clears the window and
    /// is itself dropped; the next push starts the new origin.
    pub fn push(&mut self, value: f64, now: Instant) {
        match self.policy {
            WindowPolicy::Scrolling { capacity } => {
                if self.values.len() == capacity {
                    self.values.pop_front();
                    self.elapsed.pop_front();
                }
            }
            WindowPolicy::TimedReset { span } => {
                if let Some(origin) = self.origin {
                    if now.duration_since(origin) > span {
                        self.values.clear();
                        self.elapsed.clear();
                        self.origin = None;
                        return;
                    }
                }
            }
        }

        let origin = *self.origin.get_or_insert(now);
        self.values.push_back(value);
        self.elapsed
            .push_back(now.saturating_duration_since(origin).as_secs_f64());
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no samples are stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent value, if any
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Stored values in arrival order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Seconds-since-origin timestamps, parallel to [`Self::values`]
    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.elapsed.iter().copied()
    }
}

/// Per-channel windows for the three angles plus the derived speed
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    pub roll: SampleWindow,
    pub pitch: SampleWindow,
    pub yaw: SampleWindow,
    pub speed: SampleWindow,
}

impl TelemetryStore {
    /// Create a store with the same policy on every channel
    pub fn new(policy: WindowPolicy) -> Self {
        Self {
            roll: SampleWindow::new(policy),
            pitch: SampleWindow::new(policy),
            yaw: SampleWindow::new(policy),
            speed: SampleWindow::new(policy),
        }
    }

    /// Append one orientation sample and its derived speed
    pub fn push(&mut self, sample: OrientationSample, speed: f64, now: Instant) {
        self.roll.push(sample.roll, now);
        self.pitch.push(sample.pitch, now);
        self.yaw.push(sample.yaw, now);
        self.speed.push(speed, now);
    }
}
