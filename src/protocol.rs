//! WT901 angle frame decoding
//!
//! Frame format: `[0x55] [0x53] [rollL rollH] [pitchL pitchH] [yawL yawH] [TL TH]`
//!
//! Validation is two-tier:
//! - Resync check: the first three hex nibbles must be `555`. A mismatch is a
//!   corrupt frame; the caller must discard buffered input to realign with
//!   the next frame boundary.
//! - Frame-type check: the first two bytes must be `0x55 0x53` (angle
//!   output). Frames that pass the resync check but carry a different type
//!   byte are dropped without decoding - no sample, no error.
//!
//! Either way the caller flushes the input channel after every parse attempt.
//! The sensor streams continuously, so frame alignment is only maintained by
//! that flush; it is mandatory, not an optimization.

use crate::error::{Error, Result};
use crate::types::OrientationSample;

/// Fixed frame length in bytes
pub const FRAME_LEN: usize = 11;

/// First frame byte, shared by every WT901 output packet
pub const SYNC_BYTE: u8 = 0x55;

/// Type byte for angle output frames
pub const TYPE_ANGLE: u8 = 0x53;

// Payload byte offsets (low byte of each 16-bit angle)
const OFFSET_ROLL: usize = 2;
const OFFSET_PITCH: usize = 4;
const OFFSET_YAW: usize = 6;

/// Decode one raw frame into an orientation sample
///
/// Returns:
/// - `Ok(Some(sample))` for a valid angle frame
/// - `Ok(None)` for a frame matching the resync marker but not the angle
///   frame type (silently dropped)
/// - `Err(Error::CorruptFrame)` when the resync marker is absent
pub fn decode_frame(frame: &[u8; FRAME_LEN]) -> Result<Option<OrientationSample>> {
    // Resync marker: first three hex nibbles are 5, 5, 5
    if frame[0] != SYNC_BYTE || frame[1] >> 4 != 0x5 {
        return Err(Error::CorruptFrame(frame[0], frame[1]));
    }

    // Frame-type marker: full second byte must be 0x53
    if frame[1] != TYPE_ANGLE {
        return Ok(None);
    }

    Ok(Some(OrientationSample::new(
        decode_angle(frame[OFFSET_ROLL], frame[OFFSET_ROLL + 1]),
        decode_angle(frame[OFFSET_PITCH], frame[OFFSET_PITCH + 1]),
        decode_angle(frame[OFFSET_YAW], frame[OFFSET_YAW + 1]),
    )))
}

/// Convert one little-endian 16-bit raw angle to degrees in (-180, 180]
///
/// The sensor encodes angles as `raw / 32768 * 180` over the unsigned
/// 16-bit range; values above 180 wrap into the negative half.
#[inline]
fn decode_angle(low: u8, high: u8) -> f64 {
    let raw = ((high as u16) << 8) | (low as u16);
    let degrees = (raw as f64 / 32768.0) * 180.0;
    if degrees > 180.0 {
        degrees - 360.0
    } else {
        degrees
    }
}
