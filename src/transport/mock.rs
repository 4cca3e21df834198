//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport for unit testing
///
/// Cloning shares the injected byte stream, so tests can keep a handle while
/// the reader thread owns its clone.
#[derive(Clone)]
pub struct MockTransport {
    read_buffer: Arc<Mutex<VecDeque<u8>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            read_buffer: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        let mut buf = self.read_buffer.lock().unwrap();
        buf.extend(data);
    }

    /// Number of injected bytes not yet consumed
    pub fn pending_read(&self) -> usize {
        let buf = self.read_buffer.lock().unwrap();
        buf.len()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut buf = self.read_buffer.lock().unwrap();
        let available = buf.len().min(buffer.len());

        for item in buffer.iter_mut().take(available) {
            *item = buf.pop_front().unwrap();
        }

        Ok(available)
    }

    fn discard_input(&mut self) -> Result<()> {
        let mut buf = self.read_buffer.lock().unwrap();
        buf.clear();
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
