//! Error types for TiltIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// TiltIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial device unreachable at startup
    ///
    /// Fatal: callers must not continue with a dead channel.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Frame failed header validation
    ///
    /// Recovered locally by the reader loop (resync + retry); never
    /// surfaced to the user.
    #[error("Corrupt frame: header {0:#04x} {1:#04x}")]
    CorruptFrame(u8, u8),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
