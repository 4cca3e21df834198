//! Transport layer for I/O abstraction

use crate::error::Result;

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Transport trait for sensor communication
///
/// The sensor streams unprompted; the core only ever reads, so there is no
/// write side.
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read
    ///
    /// A timed-out read returns `Ok(0)` so callers can poll a shutdown flag
    /// instead of blocking indefinitely.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Discard all buffered inbound bytes
    ///
    /// Used to resynchronize with the device's frame boundaries after every
    /// parse attempt.
    fn discard_input(&mut self) -> Result<()>;
}
