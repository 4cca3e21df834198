//! End-to-end pipeline test: mock serial bytes in, samples and speed out

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tilt_io::pipeline::{Pipeline, TelemetrySink, WeightingMode};
use tilt_io::store::WindowPolicy;
use tilt_io::telemetry::reader_loop;
use tilt_io::transport::MockTransport;
use tilt_io::types::{Axis, OrientationSample};

#[derive(Clone, Default)]
struct CollectingSink {
    samples: Arc<Mutex<Vec<OrientationSample>>>,
    speeds: Arc<Mutex<Vec<f64>>>,
    statuses: Arc<Mutex<Vec<String>>>,
}

impl TelemetrySink for CollectingSink {
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

struct Harness {
    transport: MockTransport,
    pipeline: Pipeline,
    sink: CollectingSink,
    shutdown: Arc<AtomicBool>,
    reader: Option<thread::JoinHandle<()>>,
}

impl Harness {
    fn start() -> Self {
        let sink = CollectingSink::default();
        let pipeline = Pipeline::new(
            WindowPolicy::Scrolling { capacity: 100 },
            WeightingMode::OneHot,
            Duration::ZERO,
            Box::new(sink.clone()),
        );
        let transport = MockTransport::new();
        let shutdown = Arc::new(AtomicBool::new(false));

        let reader = {
            let transport = transport.clone();
            let pipeline = pipeline.clone();
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || {
                reader_loop(transport, pipeline, shutdown, Duration::from_millis(1));
            })
        };

        Self {
            transport,
            pipeline,
            sink,
            shutdown,
            reader: Some(reader),
        }
    }

    fn sample_count(&self) -> usize {
        self.sink.samples.lock().unwrap().len()
    }

    /// Inject one frame and wait until the reader consumed it
    fn feed(&self, frame: &[u8; 11]) {
        self.transport.inject_read(frame);
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.transport.pending_read() > 0 {
            assert!(Instant::now() < deadline, "reader did not consume frame");
            thread::sleep(Duration::from_millis(2));
        }
        // One more beat so the decode outcome lands in the sink
        thread::sleep(Duration::from_millis(20));
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

const FRAME_90: [u8; 11] = [
    0x55, 0x53, 0x00, 0x40, 0x00, 0x40, 0x00, 0x40, 0x00, 0x00, 0x00,
];

fn angle_frame(roll: u16, pitch: u16, yaw: u16) -> [u8; 11] {
    let [rl, rh] = roll.to_le_bytes();
    let [pl, ph] = pitch.to_le_bytes();
    let [yl, yh] = yaw.to_le_bytes();
    [0x55, 0x53, rl, rh, pl, ph, yl, yh, 0x00, 0x00, 0x00]
}

#[test]
fn valid_frame_reaches_sink() {
    let h = Harness::start();
    h.feed(&FRAME_90);

    let samples = h.sink.samples.lock().unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0], OrientationSample::new(90.0, 90.0, 90.0));

    // Speed is neutral before any calibration
    assert_eq!(h.sink.speeds.lock().unwrap()[0], 0.0);
}

#[test]
fn corrupt_frame_is_silently_recovered() {
    let h = Harness::start();

    // Header mismatch: no sample, no status, reader keeps running
    h.feed(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(h.sample_count(), 0);
    assert!(h.sink.statuses.lock().unwrap().is_empty());

    // Next valid frame decodes normally
    h.feed(&FRAME_90);
    assert_eq!(h.sample_count(), 1);
}

#[test]
fn off_type_frame_is_dropped_without_sample() {
    let h = Harness::start();

    // 0x55 0x51 passes the resync marker but is not an angle frame
    h.feed(&[0x55, 0x51, 0x00, 0x40, 0x00, 0x40, 0x00, 0x40, 0, 0, 0]);
    assert_eq!(h.sample_count(), 0);

    h.feed(&FRAME_90);
    assert_eq!(h.sample_count(), 1);
}

#[test]
fn calibration_over_live_stream() {
    let h = Harness::start();
    h.pipeline.select_axis(Axis::Roll);

    // Level before calibration
    h.feed(&angle_frame(0, 0, 0));
    h.pipeline.start_calibration();

    // Sweep roll 0° -> 45° (0x2000 = 45°) during the session
    h.feed(&angle_frame(0x0000, 0, 0));
    h.feed(&angle_frame(0x1000, 0, 0)); // 22.5°
    h.feed(&angle_frame(0x2000, 0, 0)); // 45°
    h.pipeline.end_calibration();

    assert!(h.pipeline.is_calibrated());
    let statuses = h.sink.statuses.lock().unwrap().clone();
    assert!(statuses.iter().any(|s| s == "Calibration Successful"));

    // Roll back at the envelope extremes maps to 0% and 100%
    h.feed(&angle_frame(0x0000, 0, 0));
    assert_eq!(*h.sink.speeds.lock().unwrap().last().unwrap(), 0.0);
    h.feed(&angle_frame(0x2000, 0, 0));
    assert_eq!(*h.sink.speeds.lock().unwrap().last().unwrap(), 100.0);

    // Store kept the speed channel in step with the angle channels
    h.pipeline.with_store(|store| {
        assert_eq!(store.speed.len(), store.roll.len());
        assert_eq!(store.speed.latest(), Some(100.0));
    });
}

#[test]
fn shutdown_stops_reader_promptly() {
    let h = Harness::start();
    h.feed(&FRAME_90);

    h.shutdown.store(true, Ordering::Relaxed);
    let start = Instant::now();
    // Drop joins the reader; it must exit well under a second
    drop(h);
    assert!(start.elapsed() < Duration::from_secs(1));
}
