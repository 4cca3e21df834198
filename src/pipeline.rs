//! Shared telemetry pipeline state and the inbound control surface
//!
//! The [`Pipeline`] is the single writer of the sample store and of the
//! active speed mapper. The telemetry reader thread feeds it through
//! [`Pipeline::ingest`]; the UI collaborator drives it through `reset`,
//! `start_calibration`, `end_calibration` and `select_axis`. All shared
//! state sits behind one mutex, and a new mapper is installed by replacing
//! the value under that lock - a concurrent reader never observes a torn
//! mapper.

use crate::calibration::{AxisOffsets, CalibrationRecorder};
use crate::speed::{AxisWeighting, SpeedMapper};
use crate::store::{TelemetryStore, WindowPolicy};
use crate::types::{Axis, OrientationSample};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Display-side collaborator fed by the pipeline
///
/// Implementations render samples, speed and status text however they like;
/// the core never formats anything user-facing beyond the status messages.
pub trait TelemetrySink: Send {
    /// One offset-adjusted orientation sample
    fn on_sample(&mut self, sample: OrientationSample);

    /// The derived speed for that sample (0-100)
    fn on_speed(&mut self, speed: f64);

    /// User-visible status message (reset/calibration lifecycle)
    fn on_status(&mut self, message: &str);
}

/// Weighting strategy chosen at build time
///
/// The one-hot form takes the currently selected axis at the moment a
/// calibration completes; the range-weighted form blends all three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightingMode {
    OneHot,
    RangeWeighted,
}

struct PipelineState {
    store: TelemetryStore,
    offsets: AxisOffsets,
    mapper: SpeedMapper,
    recorder: Option<CalibrationRecorder>,
    /// Bumped on every session start and finish so a stale timeout thread
    /// cannot finalize a newer session
    session: u64,
    selected_axis: Axis,
    last_adjusted: OrientationSample,
}

/// Handle to the shared pipeline
///
/// Cheap to clone; clones share state and sink.
#[derive(Clone)]
pub struct Pipeline {
    state: Arc<Mutex<PipelineState>>,
    sink: Arc<Mutex<Box<dyn TelemetrySink>>>,
    weighting_mode: WeightingMode,
    calibration_window: Duration,
}

impl Pipeline {
    /// Create a pipeline with empty windows and a neutral mapper
    pub fn new(
        policy: WindowPolicy,
        weighting_mode: WeightingMode,
        calibration_window: Duration,
        sink: Box<dyn TelemetrySink>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(PipelineState {
                store: TelemetryStore::new(policy),
                offsets: AxisOffsets::default(),
                mapper: SpeedMapper::neutral(),
                recorder: None,
                session: 0,
                selected_axis: Axis::Roll,
                last_adjusted: OrientationSample::zero(),
            })),
            sink: Arc::new(Mutex::new(sink)),
            weighting_mode,
            calibration_window,
        }
    }

    /// Feed one decoded sample from the telemetry reader
    ///
    /// Applies the reset offsets, records into an open calibration session,
    /// evaluates the active mapper and appends to the store, then notifies
    /// the sink.
    pub fn ingest(&self, raw: OrientationSample, now: Instant) {
        let (adjusted, speed) = {
            let mut st = self.state.lock();
            let adjusted = st.offsets.apply(raw);
            st.last_adjusted = adjusted;

            if let Some(recorder) = st.recorder.as_mut() {
                recorder.record(adjusted);
            }

            let speed = st.mapper.eval(adjusted);
            st.store.push(adjusted, speed, now);
            (adjusted, speed)
        };

        let mut sink = self.sink.lock();
        sink.on_sample(adjusted);
        sink.on_speed(speed);
    }

    /// Zero the displayed orientation at the current reading
    ///
    /// Captures the latest displayed values into the cumulative offsets.
    /// Idempotent in effect: repeated resets simply compound.
    pub fn reset(&self) {
        {
            let mut st = self.state.lock();
            let latest = st.last_adjusted;
            st.offsets.accumulate(latest);
            st.last_adjusted = OrientationSample::zero();
        }
        self.status("Reset Successfully Performed");
    }

    /// Open a calibration session
    ///
    /// Clears any previous recording, zeroes the offsets at the current
    /// reading and seeds the recorder with it. The session ends on
    /// [`Self::end_calibration`] or after the configured window elapses,
    /// whichever comes first.
    pub fn start_calibration(&self) {
        let session = {
            let mut st = self.state.lock();
            let latest = st.last_adjusted;
            st.offsets.accumulate(latest);
            st.last_adjusted = OrientationSample::zero();

            st.session += 1;
            st.recorder = Some(CalibrationRecorder::start(OrientationSample::zero()));
            st.session
        };
        self.status("Calibration has started");

        if !self.calibration_window.is_zero() {
            let pipeline = self.clone();
            let window = self.calibration_window;
            let spawned = std::thread::Builder::new()
                .name("calibration-timer".to_string())
                .spawn(move || {
                    std::thread::sleep(window);
                    pipeline.finish_calibration(session);
                });
            if let Err(e) = spawned {
                log::error!("Failed to spawn calibration timer: {}", e);
            }
        }
    }

    /// Explicitly end the open calibration session, if any
    pub fn end_calibration(&self) {
        let session = self.state.lock().session;
        self.finish_calibration(session);
    }

    /// Select which axis a one-hot mapper follows
    ///
    /// Takes effect when the next calibration completes, matching the
    /// original workflow (the axis choice is read at equation-build time).
    pub fn select_axis(&self, axis: Axis) {
        self.state.lock().selected_axis = axis;
        log::debug!("Axis selection: {:?}", axis);
    }

    /// Current derived speed (latest stored value)
    pub fn current_speed(&self) -> f64 {
        self.state.lock().store.speed.latest().unwrap_or(0.0)
    }

    /// True once a calibration has installed a real mapper
    pub fn is_calibrated(&self) -> bool {
        self.state.lock().mapper.is_calibrated()
    }

    /// Run `f` against the sample store (display access)
    pub fn with_store<R>(&self, f: impl FnOnce(&TelemetryStore) -> R) -> R {
        f(&self.state.lock().store)
    }

    /// Close the session identified by `session` and install a new mapper
    ///
    /// No-op when the session already ended (explicit end raced the timeout,
    /// or a newer session is open).
    fn finish_calibration(&self, session: u64) {
        let installed = {
            let mut st = self.state.lock();
            if st.session != session {
                return;
            }
            let Some(recorder) = st.recorder.take() else {
                return;
            };
            st.session += 1;

            match recorder.envelope() {
                Some(envelope) => {
                    let weighting = match self.weighting_mode {
                        WeightingMode::OneHot => AxisWeighting::OneHot(st.selected_axis),
                        WeightingMode::RangeWeighted => AxisWeighting::RangeWeighted,
                    };
                    st.mapper = SpeedMapper::new(envelope, weighting);
                    log::info!(
                        "Calibration complete: {} samples, weighting {:?}",
                        recorder.len(),
                        weighting
                    );
                    true
                }
                None => false,
            }
        };

        if installed {
            self.status("Calibration Successful");
        } else {
            self.status("Calibration failed: no samples recorded");
        }
    }

    fn status(&self, message: &str) {
        log::info!("{}", message);
        self.sink.lock().on_status(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Sink that collects everything it is fed
    #[derive(Clone, Default)]
    struct RecordingSink {
        samples: Arc<StdMutex<Vec<OrientationSample>>>,
        speeds: Arc<StdMutex<Vec<f64>>>,
        statuses: Arc<StdMutex<Vec<String>>>,
    }

    impl TelemetrySink for RecordingSink {
        fn on_sample(&mut self, sample: OrientationSample) {
            self.samples.lock().unwrap().push(sample);
        }
        fn on_speed(&mut self, speed: f64) {
            self.speeds.lock().unwrap().push(speed);
        }
        fn on_status(&mut self, message: &str) {
            self.statuses.lock().unwrap().push(message.to_string());
        }
    }

    fn pipeline(sink: RecordingSink) -> Pipeline {
        Pipeline::new(
            WindowPolicy::Scrolling { capacity: 100 },
            WeightingMode::OneHot,
            Duration::ZERO, // no timeout thread in unit tests
            Box::new(sink),
        )
    }

    #[test]
    fn test_speed_is_zero_before_calibration() {
        let sink = RecordingSink::default();
        let p = pipeline(sink.clone());

        p.ingest(OrientationSample::new(45.0, -30.0, 120.0), Instant::now());
        assert!(!p.is_calibrated());
        assert_eq!(p.current_speed(), 0.0);
        assert_eq!(sink.speeds.lock().unwrap().as_slice(), &[0.0]);
    }

    #[test]
    fn test_reset_is_cumulative() {
        let sink = RecordingSink::default();
        let p = pipeline(sink.clone());
        let now = Instant::now();

        p.ingest(OrientationSample::new(10.0, 20.0, 30.0), now);
        p.reset();
        // Offsets now 10/20/30; the same raw reading displays as zero
        p.ingest(OrientationSample::new(10.0, 20.0, 30.0), now);
        assert_eq!(
            *sink.samples.lock().unwrap().last().unwrap(),
            OrientationSample::zero()
        );

        // Drift, reset again: offsets compound to the sum of both captures
        p.ingest(OrientationSample::new(15.0, 20.0, 30.0), now);
        p.reset();
        p.ingest(OrientationSample::new(15.0, 20.0, 30.0), now);
        assert_eq!(
            *sink.samples.lock().unwrap().last().unwrap(),
            OrientationSample::zero()
        );
        p.ingest(OrientationSample::new(16.0, 21.0, 31.0), now);
        assert_eq!(
            *sink.samples.lock().unwrap().last().unwrap(),
            OrientationSample::new(1.0, 1.0, 1.0)
        );
    }

    #[test]
    fn test_calibration_round_trip() {
        let sink = RecordingSink::default();
        let p = pipeline(sink.clone());
        let now = Instant::now();

        p.select_axis(Axis::Pitch);
        p.ingest(OrientationSample::new(0.0, 0.0, 0.0), now);
        p.start_calibration();

        // Sweep pitch over [-40, 25] during the session
        for pitch in [-10.0, -40.0, 5.0, 25.0, 0.0] {
            p.ingest(OrientationSample::new(1.0, pitch, -1.0), now);
        }
        p.end_calibration();
        assert!(p.is_calibrated());

        // At the recorded minimum the mapped speed is 0, at the maximum 100
        p.ingest(OrientationSample::new(0.0, -40.0, 0.0), now);
        assert_eq!(*sink.speeds.lock().unwrap().last().unwrap(), 0.0);
        p.ingest(OrientationSample::new(0.0, 25.0, 0.0), now);
        assert_eq!(*sink.speeds.lock().unwrap().last().unwrap(), 100.0);

        let statuses = sink.statuses.lock().unwrap();
        assert!(statuses.iter().any(|s| s == "Calibration has started"));
        assert!(statuses.iter().any(|s| s == "Calibration Successful"));
    }

    #[test]
    fn test_start_calibration_zeroes_session() {
        let sink = RecordingSink::default();
        let p = pipeline(sink.clone());
        let now = Instant::now();

        // Sensor sits at an arbitrary attitude before calibration
        p.ingest(OrientationSample::new(33.0, -7.0, 90.0), now);
        p.start_calibration();

        // The same attitude now reads as zero: the session restarted from zero
        p.ingest(OrientationSample::new(33.0, -7.0, 90.0), now);
        assert_eq!(
            *sink.samples.lock().unwrap().last().unwrap(),
            OrientationSample::zero()
        );
    }

    #[test]
    fn test_end_without_start_reports_failure() {
        let sink = RecordingSink::default();
        let p = pipeline(sink.clone());

        p.end_calibration();
        assert!(!p.is_calibrated());
        // No session was open: nothing installed, no status emitted
        assert!(sink.statuses.lock().unwrap().is_empty());
    }

    #[test]
    fn test_degenerate_calibration_yields_zero_speed() {
        let sink = RecordingSink::default();
        let p = pipeline(sink.clone());
        let now = Instant::now();

        p.start_calibration();
        // Sensor never moves during the session
        for _ in 0..5 {
            p.ingest(OrientationSample::zero(), now);
        }
        p.end_calibration();
        assert!(p.is_calibrated());

        p.ingest(OrientationSample::new(50.0, 50.0, 50.0), now);
        let speed = *sink.speeds.lock().unwrap().last().unwrap();
        assert_eq!(speed, 0.0);
        assert!(speed.is_finite());
    }

    #[test]
    fn test_stale_timer_cannot_finish_new_session() {
        let sink = RecordingSink::default();
        let p = pipeline(sink.clone());
        let now = Instant::now();

        p.start_calibration();
        let stale = 1; // session id of the first start
        p.ingest(OrientationSample::new(0.0, 10.0, 0.0), now);
        p.end_calibration();

        // A second session opens; the first session's id is dead
        p.start_calibration();
        p.finish_calibration(stale);
        // Still recording: the stale finish was ignored
        p.ingest(OrientationSample::new(0.0, 99.0, 0.0), now);
        p.end_calibration();

        let statuses = sink.statuses.lock().unwrap();
        let successes = statuses.iter().filter(|s| *s == "Calibration Successful");
        assert_eq!(successes.count(), 2);
    }
}
