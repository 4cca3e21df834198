//! Telemetry reader thread
//!
//! Owns the serial channel. Each iteration reads exactly one 11-byte frame,
//! decodes it, discards buffered input to resynchronize with the device's
//! frame boundaries (mandatory after every parse attempt), and on success
//! hands the sample to the pipeline. Corrupt or off-type frames retry
//! immediately without emitting; the fixed cadence only applies between
//! successful emissions.

use crate::pipeline::Pipeline;
use crate::protocol::{self, FRAME_LEN};
use crate::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reader loop - decodes frames and feeds the pipeline until shutdown
///
/// Transport reads are bounded by the port timeout, so the shutdown flag is
/// honored within one timeout period even mid-frame. Read errors are logged
/// and retried after a short backoff; they do not kill the loop.
pub fn reader_loop<T: Transport>(
    mut transport: T,
    pipeline: Pipeline,
    shutdown: Arc<AtomicBool>,
    cadence: Duration,
) {
    let mut frame = [0u8; FRAME_LEN];

    while !shutdown.load(Ordering::Relaxed) {
        match read_frame(&mut transport, &shutdown, &mut frame) {
            Ok(true) => {}
            Ok(false) => break, // shutdown mid-frame
            Err(e) => {
                log::error!("Serial read error: {}", e);
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
        }

        let decoded = protocol::decode_frame(&frame);

        // Resync with the device regardless of the parse outcome
        if let Err(e) = transport.discard_input() {
            log::warn!("Input flush failed: {}", e);
        }

        match decoded {
            Ok(Some(sample)) => {
                pipeline.ingest(sample, Instant::now());
                std::thread::sleep(cadence);
            }
            Ok(None) => {
                log::trace!("Skipping non-angle frame (type 0x{:02X})", frame[1]);
            }
            Err(e) => {
                // Recovered locally; invisible to the user
                log::trace!("{}, resynchronized", e);
            }
        }
    }

    log::info!("Telemetry reader exiting");
}

/// Fill `frame` with exactly [`FRAME_LEN`] bytes
///
/// Returns `Ok(false)` when shutdown was requested before the frame
/// completed.
fn read_frame<T: Transport>(
    transport: &mut T,
    shutdown: &AtomicBool,
    frame: &mut [u8; FRAME_LEN],
) -> crate::error::Result<bool> {
    let mut filled = 0;
    while filled < FRAME_LEN {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(false);
        }
        let n = transport.read(&mut frame[filled..])?;
        if n == 0 {
            // Timed out with no data; yield briefly and re-check shutdown
            std::thread::sleep(Duration::from_millis(1));
            continue;
        }
        filled += n;
    }
    Ok(true)
}
